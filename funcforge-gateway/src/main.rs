// SPDX-License-Identifier: Apache-2.0

//! FuncForge Gateway
//!
//! HTTP gateway for the FuncForge FaaS platform: accepts zipped function
//! uploads, packages them into container images, and runs them on demand.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use funcforge_core::{DockerCli, FunctionService, GatewayConfig, TemplateStore};

mod http;

/// FuncForge - minimal function-as-a-service gateway
#[derive(Parser)]
#[command(name = "funcforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "funcforge.yaml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let config = if Path::new(&cli.config).exists() {
        GatewayConfig::load_file(&cli.config)?
    } else {
        tracing::info!(path = %cli.config, "no configuration file, using defaults");
        GatewayConfig::default()
    };

    // Fail fast: templates must load before the first request arrives.
    let templates = TemplateStore::load_dir(&config.templates_dir)?;

    let service = Arc::new(FunctionService::new(
        templates,
        Arc::new(DockerCli::new()),
        config.build_deadline,
        config.run_deadline,
    ));

    let app = http::router(service, config.max_upload_bytes);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    tracing::info!("gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
