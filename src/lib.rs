pub mod cli;
pub mod error;
pub mod plugin;
pub mod provider;

/// Build version tag. Overridden at build time via the
/// `STRIPE_PROVIDER_VERSION` environment variable; `"dev"` marks a
/// development build.
pub const VERSION: &str = match option_env!("STRIPE_PROVIDER_VERSION") {
    Some(version) => version,
    None => "dev",
};
