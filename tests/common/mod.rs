//! Consolidated test utilities for mini-vcs
//!
//! This module provides unified testing utilities for integration tests,
//! driving the binary against throwaway repository roots.

pub mod assertions;
pub mod fixtures;
pub mod repository;
