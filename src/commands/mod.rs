pub mod commit;
pub mod history;
pub mod push;
pub mod stage;
pub mod status;

pub use commit::*;
pub use history::*;
pub use push::*;
pub use stage::*;
pub use status::*;
