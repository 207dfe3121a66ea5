//! New command implementation.

use missive_core::{
    create_command, create_error_reply, create_event, create_reply, EnvelopeInput, ErrorReply,
};
use serde_json::Value;

use crate::error::CliError;
use crate::input::read_text;
use crate::output::format_json;
use crate::KindArg;

pub struct NewArgs {
    pub kind: KindArg,
    pub event_type: Option<String>,
    pub source: String,
    pub subject: Option<String>,
    pub data: Option<String>,
    pub data_file: Option<String>,
    pub correlation_id: Option<String>,
    pub causation_id: Option<String>,
    pub tenant_id: Option<String>,
    pub traceparent: Option<String>,
    pub ttl: Option<i64>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

pub fn run(args: NewArgs) -> Result<(), CliError> {
    let data: Value = match (&args.data, &args.data_file) {
        (Some(inline), _) => serde_json::from_str(inline)?,
        (None, Some(path)) => serde_json::from_str(&read_text(Some(path))?)?,
        (None, None) => Value::Object(Default::default()),
    };

    let input = EnvelopeInput::<Value> {
        event_type: args.event_type,
        source: Some(args.source),
        subject: args.subject,
        correlation_id: args.correlation_id,
        causation_id: args.causation_id,
        tenant_id: args.tenant_id,
        traceparent: args.traceparent,
        ttl_sec: args.ttl,
        data: Some(data),
        ..EnvelopeInput::default()
    };

    let rendered = match args.kind {
        KindArg::Error => {
            let error = ErrorReply::new(
                args.error_code.unwrap_or_default(),
                args.error_message.unwrap_or_default(),
            );
            format_json(&create_error_reply(input, error)?)?
        }
        kind => {
            if input.event_type.is_none() {
                return Err(CliError::Config("--type is required".into()));
            }
            let envelope = match kind {
                KindArg::Command => create_command(input)?,
                KindArg::Reply => create_reply(input)?,
                _ => create_event(input)?,
            };
            format_json(&envelope)?
        }
    };
    println!("{}", rendered);
    Ok(())
}
