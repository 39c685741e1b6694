mod cli;

use structopt::StructOpt;

use crate::cli::commands::Command;
use crate::cli::Gametree;

fn main() {
    cli::logger(env_logger::Env::default()).init();

    #[cfg(feature = "instrumentation")]
    {
        if let Err(err) = gametree::instrumentation::init_tracing() {
            eprintln!("Failed to install the tracing subscriber: {}", err);
        }
    }

    Gametree::from_args().execute();

    #[cfg(feature = "instrumentation")]
    gametree::instrumentation::print_span_timings();
}
