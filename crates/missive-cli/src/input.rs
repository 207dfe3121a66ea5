//! Reading documents from files or stdin.

use std::io::{self, Read};

use missive_core::{parse, MessageEnvelope};

use crate::error::CliError;

/// Reads a file, or stdin when `path` is `None` or `-`.
pub fn read_text(path: Option<&str>) -> Result<String, CliError> {
    match path {
        Some(path) if path != "-" => std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("failed to read file {}: {}", path, e))),
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| CliError::Io(format!("failed to read stdin: {}", e)))?;
            Ok(buffer)
        }
    }
}

/// Reads and parses an envelope.
pub fn read_envelope(path: Option<&str>) -> Result<MessageEnvelope, CliError> {
    let raw = read_text(path)?;
    Ok(parse(&raw)?)
}
