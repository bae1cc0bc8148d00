//! Request handlers.

pub mod download;
pub mod files;
pub mod health;
pub mod status;
