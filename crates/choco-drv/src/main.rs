use clap::Parser;
use choco_drv::{run, Config, Outcome};

fn main() {
    let config = Config::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(&config) {
        Ok(Outcome::Clean) => {}
        Ok(Outcome::HadErrors(count)) => {
            tracing::warn!(count, "semantic errors found");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }
}
