use async_trait::async_trait;

use crate::error::Result;
use crate::provider::ProviderFactory;

pub mod serve;

pub use serve::HostServer;

/// Protocol address the host uses to match this process to a provider
/// definition during the handshake. Must match the host's registry entry
/// exactly; a mismatch is rejected on the host side.
pub const PROVIDER_ADDR: &str = "registry.terraform.io/stripe/stripe";

/// Options handed once to the chosen startup path. Immutable after
/// construction.
pub struct ServeOpts {
    pub debug: bool,
    pub provider_addr: &'static str,
    pub version: String,
    pub provider: ProviderFactory,
}

impl ServeOpts {
    pub fn new(debug: bool, version: &str, provider: ProviderFactory) -> Self {
        Self {
            debug,
            provider_addr: PROVIDER_ADDR,
            version: version.to_string(),
            provider,
        }
    }
}

/// Host-facing server entry points.
///
/// The RPC mechanics behind these calls are owned by the host plugin
/// framework, not by the bootstrap; tests substitute a fake implementation.
#[async_trait]
pub trait PluginServer {
    /// Runs the RPC serve loop for the lifetime of the process. Returns
    /// only when the host disconnects or requests shutdown.
    async fn serve(&self, opts: &ServeOpts) -> Result<()>;

    /// Blocks in a handshake that lets an external debugger attach before
    /// RPC serving begins.
    async fn debug_attach(&self, opts: &ServeOpts) -> Result<()>;
}

/// Dispatches to exactly one startup path. Every failure is terminal;
/// a provider that cannot establish its RPC channel has no degraded mode.
pub async fn run(opts: &ServeOpts, server: &dyn PluginServer) -> Result<()> {
    if opts.debug {
        server.debug_attach(opts).await
    } else {
        server.serve(opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider;

    #[test]
    fn serve_opts_carry_the_registry_address() {
        let opts = ServeOpts::new(false, "dev", provider::new("dev"));
        assert_eq!(opts.provider_addr, "registry.terraform.io/stripe/stripe");

        let opts = ServeOpts::new(true, "dev", provider::new("dev"));
        assert_eq!(opts.provider_addr, PROVIDER_ADDR);
    }
}
