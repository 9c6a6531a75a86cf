//! lazycss binary

use lazycss::Cli;
use std::process;

fn main() {
    let mut cli = Cli::new();

    if let Err(e) = cli.run() {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}
