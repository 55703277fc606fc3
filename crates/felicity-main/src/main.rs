// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Felicity Card.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use felicity_core::Widget;
use felicity_ha::{HaCommandDispatcher, HaDeviceRegistry, HaStateSnapshot, HomeAssistantClient};
use felicity_render::render_dashboard;
use felicity_types::{FlowEdge, WriteCommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "felicity", version, about = "Felicity hybrid inverter dashboard")]
struct Cli {
    /// Configuration file; otherwise /data/options.json, config.toml, config.json
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read the device from Home Assistant and render the dashboard to SVG
    Render(RenderArgs),
    /// Write a register value to the device
    Write(WriteArgs),
    /// List the device entities usable as write targets
    Entities,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Output directory, overrides render.output_dir
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep refreshing every N seconds
    #[arg(short, long)]
    watch: Option<u64>,

    /// Also print the snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct WriteArgs {
    /// Any entity of the device, e.g. sensor.felicity_battery_power
    target: String,
    /// Register key, e.g. econ_rule_1_soc
    key: String,
    value: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respects RUST_LOG environment variable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let config = AppConfig::load(cli.config.as_deref())?;
    info!("🚀 Starting Felicity Card");
    info!("📋 Configuration Summary:");
    info!(
        "   Card: {}",
        config.card.name.as_deref().unwrap_or("(unnamed)")
    );
    info!("   Device: {:?}", config.card.device_id);
    info!("   Model: {}", config.card.inverter_model);
    info!("   Overrides: {}", config.card.overrides.len());

    let client = ha_client(&config)?;
    if !client.ping().await? {
        warn!("⚠️ Home Assistant at {} is not answering", client.base_url());
    }

    let registry = HaDeviceRegistry::new(client.clone());
    load_device(&config, &registry).await?;
    let widget = Widget::bind(config.card.clone(), &registry);

    match cli.command {
        Commands::Render(args) => render(&config, &client, &registry, widget, args).await,
        Commands::Write(args) => write(&client, widget, args).await,
        Commands::Entities => {
            for entity_id in widget.write_targets() {
                println!("{entity_id}");
            }
            Ok(())
        }
    }
}

fn ha_client(config: &AppConfig) -> Result<HomeAssistantClient> {
    let client = if std::env::var("SUPERVISOR_TOKEN").is_ok() {
        info!("🏠 Initializing HA client using Supervisor API...");
        HomeAssistantClient::from_supervisor()?
    } else {
        info!("🏠 Initializing HA client from configuration...");
        HomeAssistantClient::from_config(
            config.home_assistant.base_url.clone(),
            config.home_assistant.token.clone(),
        )?
    };
    Ok(client)
}

async fn load_device(config: &AppConfig, registry: &HaDeviceRegistry) -> Result<()> {
    match config.card.device_id.as_deref() {
        Some(device_id) => {
            registry
                .load(device_id)
                .await
                .with_context(|| format!("Failed to load device {device_id}"))?;
        }
        None => warn!("No device_id configured, only overrides will resolve"),
    }
    Ok(())
}

async fn render(
    config: &AppConfig,
    client: &HomeAssistantClient,
    registry: &HaDeviceRegistry,
    mut widget: Widget,
    args: RenderArgs,
) -> Result<()> {
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.render.output_dir.clone());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let Some(secs) = args.watch else {
        return render_once(config, client, &mut widget, &output_dir, args.json).await;
    };

    info!("🔄 Refreshing every {}s, Ctrl+C to stop", secs);
    let mut interval = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if config.card.device_id.is_some() {
                    if let Err(e) = load_device(config, registry).await {
                        warn!("⚠️ Keeping previous entity index: {:#}", e);
                    } else {
                        widget.rebind_index(registry);
                    }
                }
                if let Err(e) =
                    render_once(config, client, &mut widget, &output_dir, args.json).await
                {
                    warn!("⚠️ Refresh failed: {:#}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                widget.unbind();
                return Ok(());
            }
        }
    }
}

async fn render_once(
    config: &AppConfig,
    client: &HomeAssistantClient,
    widget: &mut Widget,
    output_dir: &Path,
    json: bool,
) -> Result<()> {
    let store = HaStateSnapshot::fetch_all(client)
        .await
        .context("Failed to fetch entity states")?;
    let snapshot = widget.refresh(&store, store.fetched_at_ms());

    if let Some(pv) = snapshot.flow(FlowEdge::Pv) {
        debug!("☀️ PV: {} ({:?})", pv.formatted, pv.state);
    }
    info!(
        "🔋 Battery {} | {} | price level {}",
        snapshot
            .battery
            .soc
            .map_or_else(|| "?".to_owned(), |soc| format!("{soc:.0}%")),
        snapshot.battery.state,
        snapshot.price.level.get()
    );

    let panels = render_dashboard(
        &snapshot,
        config.render.gauge_size(),
        config.render.diagram_size(),
    )?;
    for panel in &panels {
        let path = output_dir.join(format!("{}.svg", panel.name));
        std::fs::write(&path, &panel.svg)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    info!(
        "✅ Rendered {} panels to {}",
        panels.len(),
        output_dir.display()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

async fn write(client: &HomeAssistantClient, mut widget: Widget, args: WriteArgs) -> Result<()> {
    let dispatcher = HaCommandDispatcher::new(client.clone());
    let command = WriteCommand::new(args.target, args.key, args.value);

    let status = widget.write(&dispatcher, &command).await;
    println!("{status}");
    if status.is_error() {
        anyhow::bail!("{status}");
    }
    Ok(())
}
