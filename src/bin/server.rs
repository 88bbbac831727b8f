//! Parley server binary backing the browser front-end.
//! Run with: cargo run --bin parley-server

use std::process::ExitCode;

use parley_agent::start_parley_agent;

fn main() -> ExitCode {
    start_parley_agent::run_server()
}
