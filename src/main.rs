mod args;
mod survey;

use clap::Parser;
use log::{debug, error};
use snafu::ErrorCompat;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }
    debug!("args: {:?}", args);

    if let Err(e) = survey::run_survey(&args) {
        error!("{}", e);
        eprintln!("An error occurred: {}", e);
        if args.verbose {
            for cause in e.iter_chain().skip(1) {
                eprintln!("Caused by: {}", cause);
            }
        }
        std::process::exit(1);
    }
}
