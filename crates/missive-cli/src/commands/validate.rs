//! Validate command implementation.

use missive_core::{parse, validate, EnvelopeError, MessageEnvelope, ValidationIssue};
use serde_json::json;

use crate::error::CliError;
use crate::input::read_text;
use crate::output::{format_json, print_issues};

pub fn run(input: Option<String>, strict: bool, json_output: bool) -> Result<(), CliError> {
    let raw = read_text(input.as_deref())?;

    let issues: Vec<ValidationIssue> = if strict {
        let envelope: MessageEnvelope = serde_json::from_str(&raw)?;
        validate(&envelope).issues().to_vec()
    } else {
        match parse(&raw) {
            Ok(_) => Vec::new(),
            Err(EnvelopeError::Validation(issues)) => issues.into_vec(),
            Err(other) => return Err(other.into()),
        }
    };

    if json_output {
        println!(
            "{}",
            format_json(&json!({ "valid": issues.is_empty(), "issues": issues }))?
        );
    } else if issues.is_empty() {
        println!("valid");
    } else {
        print_issues(&issues);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(CliError::Rejected(format!(
            "envelope has {} validation issue(s)",
            issues.len()
        )))
    }
}
