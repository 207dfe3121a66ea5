//! Subcommand implementations.

pub mod canonicalize;
pub mod headers;
pub mod keygen;
pub mod new;
pub mod sign;
pub mod validate;
pub mod verify;
