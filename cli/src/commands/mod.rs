//! Command implementations

pub mod apply;
pub mod validate;
pub mod version;
