//! labrig CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use labrig_common::LabPaths;
use labrig_nodes::kinds::{self, xrd};
use labrig_nodes::{MgmtNet, NodeConfig, NodeOptions, NodeRegistry, StaticRuntime};
use tabled::{Table, Tabled};
use tokio_util::sync::CancellationToken;

/// labrig - provision emulated network nodes
#[derive(Parser)]
#[command(name = "labrig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// labrig commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List registered node kinds
    Kinds,

    /// Show the XRd interface table
    Interfaces {
        /// Number of data interfaces
        #[arg(long, default_value_t = xrd::MAX_INTERFACES)]
        max: u32,
    },

    /// Prepare a node's lab directory (init + pre-deploy)
    Deploy {
        /// Node definition file
        #[arg(short, long)]
        file: PathBuf,

        /// Lab name, used when the definition has no lab_dir
        #[arg(long, default_value = "lab")]
        lab: String,

        /// Management network IPv4 gateway
        #[arg(long)]
        ipv4_gw: Option<String>,

        /// Management network IPv6 gateway
        #[arg(long)]
        ipv6_gw: Option<String>,
    },

    /// Save a running node's configuration to its startup configuration
    Save {
        /// Node definition file
        #[arg(short, long)]
        file: PathBuf,

        /// Lab name, used when the definition has no lab_dir
        #[arg(long, default_value = "lab")]
        lab: String,

        /// Session timeout in seconds
        #[arg(short, long, default_value = "60")]
        timeout: u64,
    },
}

#[derive(Tabled)]
struct KindRow {
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "DEFAULT USER")]
    username: String,
    #[tabled(rename = "PROTOCOL")]
    protocol: String,
}

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "LINUX")]
    linux: String,
    #[tabled(rename = "XR")]
    xr: String,
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self, cancel: &CancellationToken) -> Result<()> {
        let registry = NodeRegistry::new();
        kinds::register_all(&registry)?;

        match self.command {
            Commands::Kinds => {
                let rows: Vec<KindRow> = registry
                    .kinds()
                    .into_iter()
                    .map(|kind| KindRow {
                        username: registry
                            .default_credentials(&kind)
                            .map(|c| c.username)
                            .unwrap_or_default(),
                        protocol: registry
                            .descriptor(&kind)
                            .map(|d| d.management_protocol.to_string())
                            .unwrap_or_default(),
                        kind,
                    })
                    .collect();
                println!("{}", Table::new(rows));
                Ok(())
            }

            Commands::Interfaces { max } => {
                let rows: Vec<InterfaceRow> = xrd::interface_mappings(max)
                    .map(|m| InterfaceRow {
                        linux: m.linux_name,
                        xr: m.xr_name,
                    })
                    .collect();
                println!("{}", Table::new(rows));
                Ok(())
            }

            Commands::Deploy {
                file,
                lab,
                ipv4_gw,
                ipv6_gw,
            } => {
                let cfg = load_node(&file, &lab)?;
                let runtime = StaticRuntime::new("static", MgmtNet::default()).with_gateways(
                    ipv4_gw.as_deref().unwrap_or_default(),
                    ipv6_gw.as_deref().unwrap_or_default(),
                );
                let opts = NodeOptions::default().with_runtime(Arc::new(runtime));

                let mut node = registry.new_node(&cfg.kind)?;
                node.init(cfg, opts)?;
                node.pre_deploy(cancel).await?;

                let cfg = node.config();
                tracing::info!(node = %cfg.short_name, lab_dir = %cfg.lab_dir.display(), "Node prepared");
                if let Some(image) = &cfg.image {
                    println!("image: {image}");
                }
                println!("env:");
                for (key, value) in &cfg.env {
                    println!("  {key}={value}");
                }
                println!("binds:");
                for bind in &cfg.binds {
                    println!("  {bind}");
                }
                if let Some(startup) = &cfg.res_startup_config {
                    println!("startup-config: {}", startup.display());
                }
                Ok(())
            }

            Commands::Save { file, lab, timeout } => {
                let cfg = load_node(&file, &lab)?;
                let opts =
                    NodeOptions::default().with_session_timeout(Duration::from_secs(timeout));

                let mut node = registry.new_node(&cfg.kind)?;
                node.init(cfg, opts)?;
                node.save_config(cancel).await?;
                println!("Saved {}", node.config().short_name);
                Ok(())
            }
        }
    }
}

/// Load a node definition, filling in lab paths it leaves out.
///
/// The lab directory is made absolute, since bind mount host paths are taken
/// from it. A relative startup-config is resolved against the definition's
/// directory.
fn load_node(file: &Path, lab: &str) -> Result<NodeConfig> {
    let mut cfg = NodeConfig::from_file(file)?;
    let paths = LabPaths::new(lab);

    if cfg.lab_dir.as_os_str().is_empty() {
        cfg.lab_dir = paths.node_dir(&cfg.short_name);
    }
    cfg.lab_dir = std::path::absolute(&cfg.lab_dir)
        .wrap_err_with(|| format!("invalid lab directory {}", cfg.lab_dir.display()))?;
    if cfg.long_name.is_empty() {
        cfg.long_name = paths.long_name(&cfg.short_name);
    }
    if let Some(startup) = cfg.startup_config.as_mut() {
        if startup.is_relative() {
            let base = file.parent().unwrap_or_else(|| Path::new("."));
            *startup = base.join(&*startup);
        }
    }
    Ok(cfg)
}
