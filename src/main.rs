mod args;
mod survey;

use clap::Parser;
use env_logger::Env;
use log::debug;
use snafu::ErrorCompat;

use crate::args::{Args, Command};

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
    debug!("args {:?}", args);

    let res = match &args.command {
        Command::Statistics(t) => survey::run_statistics(
            &t.filename,
            &t.save,
            &t.variable,
            &t.statistic,
            t.reference.as_deref(),
        ),
        Command::Complexity(t) => survey::run_complexity(
            &t.filename,
            &t.save,
            &t.variable,
            &t.statistic,
            t.reference.as_deref(),
        ),
        Command::Majority {
            config,
            save,
            reference,
        } => survey::run_majority(config, save.as_deref(), reference.as_deref()),
        Command::Agreement {
            input,
            annotators,
            save,
            reference,
        } => survey::run_agreement(
            input,
            annotators.as_deref(),
            save,
            reference.as_deref(),
        ),
    };

    if let Err(e) = res {
        eprintln!("An error occured: {}", e);
        for cause in ErrorCompat::iter_chain(&*e).skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        if let Some(bt) = ErrorCompat::backtrace(&*e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
