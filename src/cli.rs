use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::feed::StatusFeed;
use crate::server;

#[derive(Parser)]
#[command(name = "pipeline-pulse")]
#[command(author, version, about = "Azure DevOps status feed for dashboards", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./pipeline-pulse.{toml,json,yaml,yml})
    #[arg(short, long, env = "PULSE_CONFIG")]
    config: Option<PathBuf>,

    /// IP address to bind, overrides server.host
    #[arg(long, env = "PULSE_HOST")]
    host: Option<String>,

    /// Port to listen on, overrides server.port
    #[arg(short, long, env = "PULSE_PORT")]
    port: Option<u16>,

    /// Results per pipeline, overrides server.count
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Outbound request timeout in seconds, overrides server.timeout-secs
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Cli {
    /// Merges flags into the loaded configuration; flags win.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(count) = self.count {
            config.server.count = count;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.server.timeout_secs = timeout_secs;
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);

        let ip: IpAddr = config
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid host address: {}", config.server.host))?;
        let addr = SocketAddr::new(ip, config.server.port);

        let pipelines = config.resolve_pipelines()?;
        info!("Monitoring {} pipelines", pipelines.len());

        let feed = StatusFeed::new(pipelines, Duration::from_secs(config.server.timeout_secs))?;

        server::serve(Arc::new(feed), addr).await
    }
}
