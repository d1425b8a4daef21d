use clap::Parser;
use tracing_subscriber::EnvFilter;

use teamwork_cli::{output, Args};

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match teamwork_cli::run(args) {
        Ok(report) if report.lines().is_empty() => {}
        Ok(report) => println!("{}", report.render()),
        Err(e) => {
            eprintln!("{}", output::error_line(&e.to_string()));
            std::process::exit(1);
        }
    }
}
