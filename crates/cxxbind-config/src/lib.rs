//! Configuration for cxxbind.
//!
//! Everything is optional; a missing file means the defaults below.
//!
//! # Example
//!
//! ```toml
//! # cxxbind.toml
//! [module]
//! name = "wpilib"
//! headers = ["CANTalon.h"]
//! include_prefix = "ctre/"
//!
//! [hooks]
//! order = ["reference_out", "sentinel_error"]
//!
//! [hooks.sentinel_error]
//! type_name = "CTR_Code"
//! check_fn = "CheckCTRCode"
//! ```

mod config;
mod error;

pub use config::{BindConfig, HookKind, HooksConfig, ModuleConfig, SentinelConfig, CONFIG_FILE_NAME};
pub use error::{ConfigError, Result};
