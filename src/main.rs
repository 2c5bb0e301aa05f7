//! Basket CLI - A local-first shopping list manager

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = basket_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
