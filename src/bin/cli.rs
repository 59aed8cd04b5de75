//! mcadmin CLI Client
//!
//! Command-line interface for administering memcache servers. Results are
//! printed to stdout as JSON; logs and failures go to stderr.

use clap::{Parser, Subcommand};
use mcadmin::{ClientConfig, CommandClient, McError};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

/// mcadmin CLI
#[derive(Parser, Debug)]
#[command(name = "mcadmin-cli")]
#[command(about = "Administrative client for memcache servers")]
#[command(version)]
struct Args {
    /// Server hostname
    #[arg(short, long, default_value = "127.0.0.1")]
    server: String,

    /// Server port
    #[arg(short, long, default_value = "11211")]
    port: u16,

    /// Connect/read/write timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Item limit for cachedump listings (0 = server cap)
    #[arg(long, default_value = "0")]
    cachedump_limit: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// General server statistics
    Stats,

    /// Server settings
    Settings,

    /// Slab statistics
    Slabs,

    /// Items stored in a slab
    Items {
        /// Slab id
        slab: u32,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Expiration in seconds (0 = never)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        duration: i64,
    },

    /// Delete a key
    Delete {
        /// The key to delete
        key: String,
    },

    /// Increment a counter
    Incr {
        key: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Decrement a counter
    Decr {
        key: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Flush all items after a delay
    FlushAll {
        /// Delay in seconds (0 = immediately)
        #[arg(default_value = "0", allow_negative_numbers = true)]
        delay: i64,
    },

    /// Search keys by substring
    Search {
        /// Substring to look for
        pattern: String,

        /// Include size and expiration of each match
        #[arg(short, long)]
        level: bool,

        /// Fetch the value of each match
        #[arg(short, long)]
        more: bool,
    },

    /// Send a raw command line
    Telnet {
        /// The command, e.g. "stats conns"
        command: String,
    },
}

fn main() {
    // Initialize tracing/logging (stderr keeps stdout for results)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,mcadmin=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .timeout_ms(args.timeout_ms)
        .cachedump_limit(args.cachedump_limit)
        .build();

    let client = match CommandClient::new(config) {
        Ok(c) => c,
        Err(e) => fail(e),
    };

    tracing::debug!("mcadmin v{} -> {}:{}", mcadmin::VERSION, args.server, args.port);

    let (server, port) = (args.server.as_str(), args.port);
    let result = match &args.command {
        Commands::Stats => client.stats(server, port).map(to_json),
        Commands::Settings => client.settings(server, port).map(to_json),
        Commands::Slabs => client.slabs(server, port).map(to_json),
        Commands::Items { slab } => client.items(server, port, *slab).map(to_json),
        Commands::Get { key } => client.get(server, port, key).map(|value| {
            to_json(value.map(|v| {
                let text = v.as_text().map(str::to_string);
                serde_json::json!({ "key": v.key, "flags": v.flags, "bytes": v.bytes.len(), "text": text })
            }))
        }),
        Commands::Set { key, value, duration } => client
            .set(server, port, key, value.as_bytes(), *duration)
            .map(to_json),
        Commands::Delete { key } => client.delete(server, port, key).map(to_json),
        Commands::Incr { key, value } => client.increment(server, port, key, *value).map(to_json),
        Commands::Decr { key, value } => client.decrement(server, port, key, *value).map(to_json),
        Commands::FlushAll { delay } => client.flush_all(server, port, *delay).map(to_json),
        Commands::Search { pattern, level, more } => client
            .search(server, port, pattern, *level, *more)
            .map(to_json),
        Commands::Telnet { command } => client
            .telnet(server, port, command)
            .map(serde_json::Value::String),
    };

    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("error: cannot render result: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => fail(e),
    }
}

fn to_json<T: Serialize>(value: T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|e| serde_json::Value::String(e.to_string()))
}

fn fail(err: McError) -> ! {
    eprintln!("error ({:?}): {}", err.kind(), err);
    std::process::exit(1);
}
