//! ClickUp task linking for the Fusion "Power Tools" add-in.
//!
//! The host application drives everything through [`Addin`]: it registers the
//! command buttons on start and calls [`Addin::run`] (or
//! [`Addin::run_blocking`]) when one is pressed. The host itself is reached
//! only through the [`host::Host`] trait.

pub mod cache;
pub mod clickup;
pub mod commands;
pub mod config;
pub mod deeplink;
pub mod error;
pub mod fields;
pub mod forms;
pub mod host;
pub mod logging;
pub mod model;
pub mod tinyurl;

pub use commands::{Addin, CommandId, Outcome};
pub use config::{load_config, AddinConfig};
pub use error::{ApiError, CommandError};
pub use host::Host;
