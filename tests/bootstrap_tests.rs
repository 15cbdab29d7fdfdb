use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use clap::Parser;

use terraform_provider_stripe::cli::Args;
use terraform_provider_stripe::error::{PluginError, Result};
use terraform_provider_stripe::plugin::{self, PluginServer, ServeOpts, PROVIDER_ADDR};
use terraform_provider_stripe::provider;
use terraform_provider_stripe::VERSION;

/// Fake host-facing server that records which startup path was taken.
#[derive(Default)]
struct RecordingServer {
    serve_called: AtomicBool,
    debug_called: AtomicBool,
}

#[async_trait]
impl PluginServer for RecordingServer {
    async fn serve(&self, _opts: &ServeOpts) -> Result<()> {
        self.serve_called.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn debug_attach(&self, _opts: &ServeOpts) -> Result<()> {
        self.debug_called.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Fake server whose debug handshake always fails.
#[derive(Default)]
struct FailingDebugServer {
    serve_called: AtomicBool,
}

#[async_trait]
impl PluginServer for FailingDebugServer {
    async fn serve(&self, _opts: &ServeOpts) -> Result<()> {
        self.serve_called.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn debug_attach(&self, _opts: &ServeOpts) -> Result<()> {
        Err(PluginError::Handshake(
            "debugger channel unavailable".to_string(),
        ))
    }
}

fn opts_for(debug: bool) -> ServeOpts {
    ServeOpts::new(debug, VERSION, provider::new(VERSION))
}

#[tokio::test]
async fn no_flags_selects_the_serving_path() {
    let args = Args::try_parse_from(["terraform-provider-stripe"]).unwrap();
    assert!(!args.debug);

    let server = RecordingServer::default();
    plugin::run(&opts_for(args.debug), &server).await.unwrap();

    assert!(server.serve_called.load(Ordering::SeqCst));
    assert!(!server.debug_called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn debug_flag_selects_the_debug_attach_path() {
    let args = Args::try_parse_from(["terraform-provider-stripe", "--debug"]).unwrap();
    assert!(args.debug);

    let server = RecordingServer::default();
    plugin::run(&opts_for(args.debug), &server).await.unwrap();

    assert!(server.debug_called.load(Ordering::SeqCst));
    assert!(!server.serve_called.load(Ordering::SeqCst));
}

#[test]
fn unrecognized_flags_are_a_usage_error() {
    let result = Args::try_parse_from(["terraform-provider-stripe", "--not-a-flag"]);
    assert!(result.is_err());
}

#[test]
fn serve_opts_carry_the_constant_address() {
    assert_eq!(opts_for(false).provider_addr, PROVIDER_ADDR);
    assert_eq!(opts_for(true).provider_addr, PROVIDER_ADDR);
    assert_eq!(PROVIDER_ADDR, "registry.terraform.io/stripe/stripe");
}

#[test]
fn default_version_tag_is_dev() {
    // Holds unless STRIPE_PROVIDER_VERSION was set at build time.
    let provider = provider::new(VERSION)();
    assert_eq!(provider.version(), "dev");
}

#[tokio::test]
async fn failing_debug_handshake_never_enters_serving() {
    let server = FailingDebugServer::default();
    let result = plugin::run(&opts_for(true), &server).await;

    assert!(matches!(result, Err(PluginError::Handshake(_))));
    assert!(!server.serve_called.load(Ordering::SeqCst));
}
