//! CLI command implementations

pub mod export;
pub mod init;
pub mod status;
pub mod validate;
