//! kvrpc CLI Client
//!
//! Command-line interface for calling a KeyValues RPC server.

use clap::{Parser, Subcommand};
use kvrpc::{params, Client, ClientConfig, KeyValues, KvRpcError};
use tracing_subscriber::{fmt, EnvFilter};

/// kvrpc CLI
#[derive(Parser, Debug)]
#[command(name = "kvrpc-cli")]
#[command(about = "CLI for KeyValues RPC servers")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:27115")]
    server: String,

    /// Connect/read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Call a method and print its result
    Call {
        /// Method name
        method: String,

        /// Named parameter (key=value), repeatable
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Send a notification (no response)
    Notify {
        /// Method name
        method: String,

        /// Named parameter (key=value), repeatable
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Run the sample calls against a server
    Demo,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kvrpc=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .server_addr(&args.server)
        .timeout_ms(args.timeout_ms)
        .build();

    let client = match Client::new(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = match args.command {
        Commands::Call { method, params } => client
            .call(&method, params.into_iter().collect())
            .map(|result| print_result(&result)),
        Commands::Notify { method, params } => client.notify(&method, params.into_iter().collect()),
        Commands::Demo => {
            run_demo(&client);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn print_result(result: &Option<KeyValues>) {
    match result {
        Some(kv) => print!("{}", kv),
        None => println!("none"),
    }
}

/// Each call is reported independently; a failing call does not stop the run
fn run_demo(client: &Client) {
    let calls = [
        ("engine_time", KeyValues::new()),
        ("give_me_a_failure", KeyValues::new()),
        ("add_my_numbers", params! { "a" => 1, "b" => 178 }),
        ("not_a_valid_function", KeyValues::new()),
        ("echo", params! { "message" => "こんにちは、世界" }),
    ];

    for (method, params) in calls {
        println!("> {}", method);
        match client.call(method, params) {
            Ok(result) => print_result(&result),
            Err(KvRpcError::Rpc { message, code }) => println!("error {}: {}", code, message),
            Err(e) => println!("failed: {}", e),
        }
    }
}
