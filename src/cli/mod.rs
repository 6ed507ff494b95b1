pub mod logging;
pub mod options;

pub use options::Cli;
