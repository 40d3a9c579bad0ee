mod cli;

use rangegate::{
    config,
    server,
    streaming::{mime::resolve_content_type, GatewayConfig, StreamGateway},
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use rangegate_common::ObjectId;
use serde_json::json;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting rangegate server");
    tracing::info!(
        "Server will listen on {}:{} ({} store, {} byte buffer)",
        config.server.host,
        config.server.port,
        config.store.backend,
        config.streaming.buffer_size
    );

    server::start_server(config).await
}

async fn inspect_object(
    object_id: &str,
    json_output: bool,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let id = ObjectId::new(object_id)?;

    let store = config
        .store
        .build()
        .context("Failed to initialise object store")?;
    let gateway = StreamGateway::new(
        store,
        GatewayConfig::new(config.streaming.buffer_size, &config.server.public_base_url)?,
    );

    let metadata = gateway
        .metadata(&id)
        .await
        .with_context(|| format!("Could not resolve object '{}'", id))?;
    let content_type = resolve_content_type(
        metadata.declared_mime_type.as_deref(),
        metadata.name.as_deref(),
    );
    let stream_url = gateway.stream_url(&id);

    if json_output {
        let doc = json!({
            "id": id.as_str(),
            "name": metadata.name,
            "size": metadata.size,
            "declared_mime_type": metadata.declared_mime_type,
            "content_type": content_type,
            "stream_url": stream_url,
            "store": gateway.store().name(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("Object: {}", id);
        println!("Store: {}", gateway.store().name());
        if let Some(ref name) = metadata.name {
            println!("Name: {}", name);
        }
        println!("Size: {} bytes", metadata.size);
        if let Some(ref declared) = metadata.declared_mime_type {
            println!("Declared type: {}", declared);
        }
        println!("Content-Type: {}", content_type);
        println!("Stream URL: {}", stream_url);
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Public base URL: {}", config.server.public_base_url);
            println!("  Buffer size: {} bytes", config.streaming.buffer_size);
            println!("  Store backend: {}", config.store.backend);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Store backend: {}", config.store.backend);
        }
    }

    Ok(())
}

fn show_version() {
    println!("rangegate {}", env!("CARGO_PKG_VERSION"));
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "rangegate=trace,rangegate_store=debug,tower_http=debug".to_string()
        } else {
            "rangegate=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Inspect { object_id, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(inspect_object(&object_id, json, cli.config.as_deref()))
        }
        Commands::Validate { config } => {
            validate_config(config.as_deref().or(cli.config.as_deref()))
        }
        Commands::Version => {
            show_version();
            Ok(())
        }
    }
}
