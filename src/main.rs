use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use service_lifetimes::{
    simulate, web, ConfigProvider, HostConfig, ServiceCollection, ServiceCollectionExt,
    ServiceProvider, TracingObserver, WorkServicesModule,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Transient, scoped and singleton services side by side", long_about = None)]
struct Args {
    /// Flat or nested JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a number of scopes in sequence and run every work service in each
    Simulate {
        /// Number of scopes to open (overrides `host.requests`)
        #[arg(short, long)]
        requests: Option<usize>,
    },
    /// Serve `GET /work` over HTTP, one scope per request
    Serve {
        /// Listen address (overrides `host.bind`)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigProvider::for_host(args.config.as_deref())
        .context("failed to load configuration")?;
    let host = HostConfig::load(&config);
    init_tracing(&host.log_filter);

    let provider = Arc::new(build_provider()?);

    match args.command {
        Command::Simulate { requests } => {
            let observations = simulate(&provider, requests.unwrap_or(host.requests))
                .context("simulation failed")?;
            info!(observations = observations.len(), "simulation finished");
        }
        Command::Serve { bind } => {
            let bind = bind.unwrap_or(host.bind);
            web::serve(provider.clone(), &bind)
                .await
                .with_context(|| format!("failed to serve on {bind}"))?;
        }
    }

    provider.dispose_all().await;
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_provider() -> Result<ServiceProvider> {
    let mut services = ServiceCollection::new().add_module(WorkServicesModule)?;
    services.add_observer(Arc::new(TracingObserver::new()));
    Ok(services.build())
}
