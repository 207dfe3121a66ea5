//! Canonicalize command implementation.

use missive_canonical::Canonicalizer;
use serde_json::Value;

use crate::error::CliError;
use crate::input::read_text;

pub fn run(input: Option<String>) -> Result<(), CliError> {
    let json_str = read_text(input.as_deref())?;
    let value: Value = serde_json::from_str(&json_str)?;
    let canonical = Canonicalizer::new().canonicalize_value(&value)?;
    println!("{}", canonical);
    Ok(())
}
