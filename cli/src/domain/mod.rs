//! Domain layer: pure provisioning types, command building, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;

pub use command::{CommandResult, RemoteCommand};
pub use config::{ConnectionInfo, ProvisionFile, ProvisioningConfig, validate_lists};
pub use error::ProvisionError;
