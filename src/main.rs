//! Command line front end of the Grandstream provisioning plugin.
//!
//! Usage:
//!   gs-provd extract "Grandstream Model HW GXP2160 SW 1.0.11.48 DevId 000b8240d55c"
//!   gs-provd -c /etc/gs-provd.conf configure --device dev.json --raw-config raw.json
//!   gs-provd --stderr package --source plugins/grandstream2 --version 1.0.11.48 --dest build/

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{error, info};

use gs_provd::config::{self, PluginConfig};
use gs_provd::render::GsProvisionRenderer;
use gs_provd::{package, Device, GrandstreamPlugin, RawConfig};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "gs-provd", about = "Grandstream phone provisioning plugin")]
struct Cli {
    /// Path to the plugin configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Log to stderr instead of syslog.
    #[arg(long)]
    stderr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Identify a device from its User-Agent and print it as JSON.
    Extract {
        user_agent: String,
    },
    /// Print the support level of a device.
    Associate {
        #[arg(long)]
        vendor:  Option<String>,
        #[arg(long)]
        model:   Option<String>,
        #[arg(long)]
        version: Option<String>,
    },
    /// Write the configuration file of a device.
    Configure {
        /// Device as JSON.
        #[arg(long)]
        device:     PathBuf,
        /// Raw configuration as JSON.
        #[arg(long)]
        raw_config: PathBuf,
    },
    /// Remove the configuration file of a device.
    Deconfigure {
        #[arg(long)]
        mac: String,
    },
    /// Assemble the distributable plugin directory for a version.
    Package {
        #[arg(long)]
        source:  PathBuf,
        #[arg(long, default_value = gs_provd::assoc::VERSION)]
        version: String,
        #[arg(long)]
        dest:    PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => match config::load_config(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("gs-provd: config error: {e}");
                process::exit(1);
            }
        },
        None => PluginConfig::default(),
    };
    if let Err(e) = config::validate_config(&cfg) {
        eprintln!("gs-provd: config validation: {e}");
        process::exit(1);
    }

    let use_syslog = cfg.log_syslog && !cli.stderr;
    if let Err(e) = setup_logging(use_syslog) {
        eprintln!("gs-provd: {e}");
        process::exit(1);
    }

    if let Err(e) = run(cli.command, cfg) {
        error!("{e:#}");
        eprintln!("gs-provd: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command, cfg: PluginConfig) -> anyhow::Result<()> {
    let plugin = GrandstreamPlugin::new(cfg, Arc::new(GsProvisionRenderer::new()), None);

    match command {
        Command::Extract { user_agent } => match plugin.extract(Some(&user_agent)) {
            Some(device) => println!("{}", serde_json::to_string_pretty(&device)?),
            None => anyhow::bail!("unrecognized User-Agent: {user_agent}"),
        },
        Command::Associate { vendor, model, version } => {
            let device = Device { vendor, model, version, ..Device::default() };
            println!("{}", plugin.associate(&device));
        }
        Command::Configure { device, raw_config } => {
            let device: Device = read_json(&device)?;
            let mut raw: RawConfig = read_json(&raw_config)?;
            let path = plugin.configure(&device, &mut raw).context("configure")?;
            info!("HTTP root: {}", plugin.http_root().display());
            println!("{}", path.display());
        }
        Command::Deconfigure { mac } => {
            let mac = gs_provd::util::norm_mac(&mac)?;
            plugin.deconfigure(&Device::with_mac(mac))?;
        }
        Command::Package { source, version, dest } => {
            let out = package::package(&source, &version, &dest)?;
            info!("plugin {version} packaged");
            println!("{}", out.display());
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}

// ── Logging setup ─────────────────────────────────────────────────────────────

fn setup_logging(use_syslog: bool) -> anyhow::Result<()> {
    if use_syslog {
        let formatter = syslog::Formatter3164 {
            facility: syslog::Facility::LOG_DAEMON,
            hostname: None,
            process:  "gs-provd".into(),
            pid:      process::id(),
        };
        let logger = syslog::unix(formatter)
            .map_err(|e| anyhow::anyhow!("syslog connect failed: {e}"))?;
        log::set_boxed_logger(Box::new(syslog::BasicLogger::new(logger)))
            .map(|()| log::set_max_level(log::LevelFilter::Info))
            .map_err(|e| anyhow::anyhow!("set_logger: {e}"))?;
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }
    Ok(())
}
