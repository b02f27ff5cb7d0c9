use cmux_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; falls back to stderr.
    logging::init();

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("cmux error: {:#}", err);
        std::process::exit(1);
    }
}
