use clap::{CommandFactory, Parser};
use facefit::cli::Args;
use facefit::Outcome;

fn init_logging(verbose: bool) {
    let default = if verbose { "facefit=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => err.exit(),
    };

    init_logging(args.verbose);

    let run = match args.resolve() {
        Ok(Some(run)) => run,
        Ok(None) => {
            let _ = Args::command().print_help();
            println!();
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(err.exit_code());
        }
    };

    let code = match run.execute() {
        Ok(outcome) => {
            if outcome == Outcome::Cancelled {
                println!("Stopping prematurely.");
            }
            outcome.exit_code()
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            err.exit_code()
        }
    };

    std::process::exit(code);
}
