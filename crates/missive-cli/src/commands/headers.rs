//! Headers command implementation.

use std::collections::BTreeMap;

use missive_headers::to_headers;

use crate::error::CliError;
use crate::input::read_envelope;
use crate::output::format_json;

pub fn run(input: Option<String>, json_output: bool) -> Result<(), CliError> {
    let envelope = read_envelope(input.as_deref())?;
    let headers = to_headers(&envelope);

    if json_output {
        let map: BTreeMap<&str, &str> = headers.iter().collect();
        println!("{}", format_json(&map)?);
    } else {
        for (name, value) in headers.iter() {
            println!("{}: {}", name, value);
        }
    }
    Ok(())
}
