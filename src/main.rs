use clap::Parser;
use tracing::error;

use terraform_provider_stripe::cli::Args;
use terraform_provider_stripe::plugin::{self, HostServer, ServeOpts};
use terraform_provider_stripe::provider;
use terraform_provider_stripe::VERSION;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing. Logs go to stderr because stdout carries the
    // handshake line the host parses.
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                format!("terraform_provider_stripe={log_level}")
                    .parse()
                    .unwrap(),
            ),
        )
        .init();

    let opts = ServeOpts::new(args.debug, VERSION, provider::new(VERSION));
    let server = HostServer::new();

    if let Err(e) = plugin::run(&opts, &server).await {
        error!("Failed to start provider plugin: {}", e);
        std::process::exit(1);
    }
}
