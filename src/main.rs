//! Script conformance harness
//!
//! Usage: `script-harness <root-directory> <interpreter>`

use clap::Parser;
use harness::{cli, commands::Cli, common::logging};

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
