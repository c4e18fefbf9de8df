//! Configuration file handling.
//!
//! Settings are read from `~/.locupdates/config.ini` and mapped onto the
//! runtime types the library uses:
//!
//! - `[updates]` → [`UpdateRequest`](crate::request::UpdateRequest)
//! - `[coordinator]` → [`CoordinatorConfig`](crate::coordinator::CoordinatorConfig)
//! - `[logging]` → log file location
//!
//! # Example
//!
//! ```no_run
//! use locupdates::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let request = config.update_request()?;
//! println!("Requesting updates {}", request);
//! # Ok::<(), locupdates::config::ConfigFileError>(())
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{ConfigFile, CoordinatorSettings, LoggingSettings, UpdateSettings};
