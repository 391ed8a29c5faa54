mod client;
mod normalize;
mod provider;
mod types;

pub use client::AzureClient;
pub use provider::AzureProvider;
pub use types::Mode;
