//! txin CLI Application
//!
//! A command-line tool for inspecting serialized transaction inputs and
//! output points.

use clap::{Parser, Subcommand};
use txin_model::cli;

#[derive(Parser)]
#[command(name = "txin")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Inspect serialized transaction inputs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a hex-encoded input and print it as JSON
    Decode {
        /// Serialized input bytes, hex encoded
        data: String,

        /// Read the compact store encoding instead of the wire encoding
        #[arg(long)]
        store: bool,

        /// Derive addresses with testnet version bytes
        #[arg(long)]
        testnet: bool,
    },

    /// Print the serialized key of an output point
    Point {
        /// Transaction hash in display (byte-reversed) hex
        hash: String,

        /// Output index
        index: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            data,
            store,
            testnet,
        } => cli::cmd_decode(&data, store, testnet)?,
        Commands::Point { hash, index } => cli::cmd_point(&hash, index)?,
    }

    Ok(())
}
