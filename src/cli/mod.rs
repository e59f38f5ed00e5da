pub mod args;
pub mod commands;
pub mod logging;

pub use args::{Cli, Commands};
pub use commands::run;
pub use logging::init_logging;
