//! MAB - Interactive shell for mobile-backend projects

use std::process::ExitCode;

fn main() -> ExitCode {
    match mab_cli::cli::run() {
        // Negative dispatch codes wrap into the 8-bit exit status
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
