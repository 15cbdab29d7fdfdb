use clap::Parser;

/// Launch configuration, parsed once at process start and immutable
/// afterwards. Unrecognized flags are rejected by clap with a usage error
/// and a non-zero exit.
#[derive(Parser, Debug)]
#[command(name = "terraform-provider-stripe")]
#[command(about = "Terraform provider plugin for Stripe", long_about = None)]
pub struct Args {
    /// Run the provider with support for debuggers like delve
    #[arg(long)]
    pub debug: bool,
}
