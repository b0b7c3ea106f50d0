use clap::{Parser, Subcommand};
use mini_vcs::commands::*;
use mini_vcs::core::{config::DEFAULT_UPLOAD_JOBS, error::Result, print_error};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mini-vcs")]
#[command(about = "Stage, commit and push file snapshots")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Repository root
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy files into the staging area
    Stage {
        /// Files to stage
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Snapshot everything staged
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },
    /// Mirror commits locally and upload them to S3
    Push {
        /// Mirror directory (default: .repoMeta/remote)
        #[arg(long)]
        mirror: Option<PathBuf>,
        /// Parallel uploads
        #[arg(short, long, default_value_t = DEFAULT_UPLOAD_JOBS)]
        jobs: usize,
        /// S3 region, overrides config and AWS_REGION
        #[arg(long)]
        region: Option<String>,
        /// S3 bucket, overrides config and S3_BUCKET
        #[arg(long)]
        bucket: Option<String>,
        /// S3-compatible endpoint URL
        #[arg(long)]
        endpoint: Option<String>,
        /// Print the push report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show staged files and commit count
    Status,
    /// Show commits, newest first
    Log,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let root = cli.root;
    let result = match cli.command {
        Commands::Stage { paths } => execute_stage(&root, paths),
        Commands::Commit { message } => execute_commit(&root, &message),
        Commands::Push {
            mirror,
            jobs,
            region,
            bucket,
            endpoint,
            json,
        } => execute_push(
            &root,
            PushArgs {
                mirror,
                jobs,
                region,
                bucket,
                endpoint,
                json,
            },
        ),
        Commands::Status => execute_status(&root),
        Commands::Log => execute_history(&root),
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
