use tracing_subscriber::EnvFilter;

mod cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(cli::run_from_env());
}
