//! The `runner` binary's library half: exercised directly by integration
//! tests, re-exported for `main.rs`.

pub mod acquisition;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod raw_inputs;
pub mod settings;

pub use acquisition::{Acquisition, UnavailableAcquisition};
pub use cli::{Cli, Command};
pub use error::{CliError, CliResult};
pub use settings::Settings;
