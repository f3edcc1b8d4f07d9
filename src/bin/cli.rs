//! thot CLI Client
//!
//! Command-line interface for interacting with a thot store.

use clap::{Parser, Subcommand};
use thot::{Config, Connector, StoreConnector};
use tracing_subscriber::{fmt, EnvFilter};

/// thot CLI
#[derive(Parser, Debug)]
#[command(name = "thot-cli")]
#[command(about = "CLI for the thot key-value store")]
#[command(version)]
struct Args {
    /// Store host (ignored while dev mode is on)
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Store port
    #[arg(short, long, default_value_t = thot::config::STORE_PORT)]
    port: u16,

    /// Force localhost addressing
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    dev_mode: bool,

    /// Read host, port and dev mode from THOT_* environment variables instead
    #[arg(long)]
    from_env: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a bucket
    Create {
        bucket: String,

        /// Maximum number of keys
        #[arg(short, long, default_value_t = thot::protocol::DEFAULT_MAX_KEYS)]
        max_keys: u32,

        /// Create a volatile bucket
        #[arg(long)]
        volatile: bool,
    },

    /// Write a JSON value under a key
    Write {
        bucket: String,
        key: String,

        /// JSON text of the value
        value: String,

        /// Create the bucket as volatile if it does not exist
        #[arg(long)]
        volatile: bool,
    },

    /// Read a key
    Read { bucket: String, key: String },

    /// Read every key matching a regex
    ReadPattern { bucket: String, pattern: String },

    /// Delete a key
    Delete { bucket: String, key: String },

    /// Delete every key matching a regex
    DeletePattern { bucket: String, pattern: String },

    /// List the keys of a bucket
    Keys { bucket: String },

    /// List buckets
    Buckets,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,thot=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = if args.from_env {
        match Config::from_env() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(2);
            }
        }
    } else {
        Config::builder()
            .db_host(&args.host)
            .port(args.port)
            .dev_mode(args.dev_mode)
            .build()
    };

    tracing::debug!("thot-cli v{} -> {}:{}", thot::VERSION, config.store_host(), config.port);

    let connector = Connector::new(config);

    let ok = match args.command {
        Commands::Create {
            bucket,
            max_keys,
            volatile,
        } => connector.create(&bucket, max_keys, volatile),
        Commands::Write {
            bucket,
            key,
            value,
            volatile,
        } => {
            let value: serde_json::Value = match serde_json::from_str(&value) {
                Ok(value) => value,
                Err(e) => {
                    tracing::error!("Value is not valid JSON: {}", e);
                    std::process::exit(2);
                }
            };
            if volatile {
                connector.write_create_volatile(&bucket, &key, &value)
            } else {
                connector.write(&bucket, &key, &value)
            }
        }
        Commands::Read { bucket, key } => {
            print_json(connector.read::<serde_json::Value>(&bucket, &key))
        }
        Commands::ReadPattern { bucket, pattern } => {
            print_json(connector.read_pattern::<serde_json::Value>(&bucket, &pattern))
        }
        Commands::Delete { bucket, key } => connector.delete(&bucket, &key),
        Commands::DeletePattern { bucket, pattern } => connector.delete_pattern(&bucket, &pattern),
        Commands::Keys { bucket } => print_json(Some(connector.get_keys(&bucket))),
        Commands::Buckets => print_json(Some(connector.get_buckets())),
    };

    if !ok {
        std::process::exit(1);
    }
}

/// Print a result as JSON, reporting whether there was one
fn print_json<T: serde::Serialize>(result: Option<T>) -> bool {
    match result {
        Some(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{}", text);
                true
            }
            Err(e) => {
                tracing::error!("Cannot render result: {}", e);
                false
            }
        },
        None => {
            println!("(absent)");
            false
        }
    }
}
