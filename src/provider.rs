use std::sync::Arc;

/// Factory invoked by the host-facing server during the RPC handshake.
pub type ProviderFactory = Arc<dyn Fn() -> Provider + Send + Sync>;

/// Opaque provider object handed to the host plugin framework.
///
/// Resource and data source behavior registers here. The bootstrap never
/// inspects the provider beyond passing the factory into the serve options.
#[derive(Debug, Clone)]
pub struct Provider {
    name: &'static str,
    version: String,
}

impl Provider {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Builds the provider-construction function for the given build version.
/// The version tag is captured so the provider can report it to the host.
pub fn new(version: &str) -> ProviderFactory {
    let version = version.to_string();
    Arc::new(move || Provider {
        name: "stripe",
        version: version.clone(),
    })
}
