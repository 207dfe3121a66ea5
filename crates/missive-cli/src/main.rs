//! Missive CLI - build, inspect, sign and verify message envelopes.

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;
mod input;
mod keyring;
mod output;

use commands::{canonicalize, headers, keygen, new, sign, validate, verify};

#[derive(Parser)]
#[command(name = "missive")]
#[command(about = "Build, sign and verify Missive message envelopes")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Signature value encoding.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EncodingArg {
    /// URL-safe base64 without padding
    Base64url,
    /// Standard base64 with padding
    Base64,
}

/// Envelope flavor built by `new`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Event,
    Command,
    Reply,
    Error,
}

#[derive(Subcommand)]
enum Commands {
    /// Show canonical bytes for input JSON
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
    },
    /// Build a new envelope and print it
    New {
        /// Envelope flavor
        #[arg(long, value_enum, default_value = "event")]
        kind: KindArg,
        /// Event type, like order.created (defaults to error.reply for errors)
        #[arg(long = "type")]
        event_type: Option<String>,
        /// Producer, like svc.orders
        #[arg(long)]
        source: String,
        /// Subject within the source
        #[arg(long)]
        subject: Option<String>,
        /// Inline JSON payload
        #[arg(long, conflicts_with = "data_file")]
        data: Option<String>,
        /// File holding the JSON payload ("-" for stdin)
        #[arg(long)]
        data_file: Option<String>,
        /// Correlation id (defaults to the new id)
        #[arg(long)]
        correlation_id: Option<String>,
        /// Id of the envelope that caused this one
        #[arg(long)]
        causation_id: Option<String>,
        /// Tenant partition hint
        #[arg(long)]
        tenant_id: Option<String>,
        /// W3C traceparent
        #[arg(long)]
        traceparent: Option<String>,
        /// Time to live in seconds
        #[arg(long)]
        ttl: Option<i64>,
        /// Error code (error replies)
        #[arg(long, required_if_eq("kind", "error"))]
        error_code: Option<String>,
        /// Error message (error replies)
        #[arg(long, required_if_eq("kind", "error"))]
        error_message: Option<String>,
    },
    /// Parse and validate an envelope
    Validate {
        /// Input envelope file (or stdin if not provided)
        input: Option<String>,
        /// Check the document as-is instead of normalizing it first
        #[arg(long)]
        strict: bool,
        /// Output issues as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign an envelope and print the result
    Sign {
        /// Input envelope file (or stdin if not provided)
        input: Option<String>,
        /// Algorithm: EdDSA, ES256 or HS256
        #[arg(long)]
        alg: String,
        /// Key id written into the signature
        #[arg(long, env = "MISSIVE_KID")]
        kid: String,
        /// HMAC secret (HS256)
        #[arg(long, env = "MISSIVE_HMAC_SECRET", hide_env_values = true)]
        secret: Option<String>,
        /// File holding the base64 private key (EdDSA, ES256)
        #[arg(long)]
        key_file: Option<String>,
        /// Signature value encoding
        #[arg(long, value_enum, default_value = "base64url")]
        encoding: EncodingArg,
    },
    /// Verify an envelope signature
    Verify {
        /// Input envelope file (or stdin if not provided)
        input: Option<String>,
        /// TOML keyring listing verification keys
        #[arg(long, env = "MISSIVE_KEYRING")]
        keyring: Option<String>,
        /// Key id for a single HS256 secret
        #[arg(long, env = "MISSIVE_KID")]
        kid: Option<String>,
        /// HMAC secret for a single HS256 key
        #[arg(long, env = "MISSIVE_HMAC_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
    /// Print the transport headers for an envelope
    Headers {
        /// Input envelope file (or stdin if not provided)
        input: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a key pair for testing
    Keygen {
        /// Algorithm: EdDSA, ES256 or HS256
        #[arg(long)]
        alg: String,
        /// Key id used in the keyring snippet
        #[arg(long, default_value = "key-1")]
        kid: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Canonicalize { input } => canonicalize::run(input),
        Commands::New {
            kind,
            event_type,
            source,
            subject,
            data,
            data_file,
            correlation_id,
            causation_id,
            tenant_id,
            traceparent,
            ttl,
            error_code,
            error_message,
        } => new::run(new::NewArgs {
            kind,
            event_type,
            source,
            subject,
            data,
            data_file,
            correlation_id,
            causation_id,
            tenant_id,
            traceparent,
            ttl,
            error_code,
            error_message,
        }),
        Commands::Validate {
            input,
            strict,
            json,
        } => validate::run(input, strict, json),
        Commands::Sign {
            input,
            alg,
            kid,
            secret,
            key_file,
            encoding,
        } => sign::run(input, alg, kid, secret, key_file, encoding),
        Commands::Verify {
            input,
            keyring,
            kid,
            secret,
        } => verify::run(input, keyring, kid, secret),
        Commands::Headers { input, json } => headers::run(input, json),
        Commands::Keygen { alg, kid } => keygen::run(alg, kid),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
