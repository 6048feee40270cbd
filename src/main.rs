//! NAS Array Probe
//!
//! Diagnostics CLI for the array management API: logs in through the
//! configured candidate URLs, runs one read-only query and logs out.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nas_array_client::constants::{PORT_TYPE_BOND, PORT_TYPE_ETH};
use nas_array_client::{ArrayClient, ArrayConfig, Error, QosPolicy, Result};

// =============================================================================
// CLI Arguments
// =============================================================================

/// NAS Array Probe - query a storage array through its management API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file; command-line credentials override it
    #[arg(long, env = "NAS_ARRAY_CONFIG")]
    config: Option<PathBuf>,

    /// Candidate REST URLs separated by ';'
    #[arg(long, env = "NAS_ARRAY_REST_URL")]
    rest_url: Option<String>,

    /// Array account name
    #[arg(long, env = "NAS_ARRAY_USERNAME")]
    username: Option<String>,

    /// Array account password
    #[arg(long, env = "NAS_ARRAY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the device ID
    Login,
    /// Print the array's system record
    Info,
    /// List storage pools, or one file pool by name
    Pools {
        #[arg(long)]
        name: Option<String>,
    },
    /// List QoS policies
    Qos,
    /// List eth and bond ports, or resolve one port ID
    Ports {
        /// Port location (eth) or name (bond)
        #[arg(long)]
        name: Option<String>,
        /// Resolve `name` among bond ports instead of eth ports
        #[arg(long)]
        bond: bool,
    },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting NAS Array Probe");
    info!("  Version: {}", nas_array_client::VERSION);

    let config = load_config(&args)?;
    info!("  Candidate URLs: {}", config.candidate_urls().len());

    let client = ArrayClient::new(config)?;
    let device_id = client.login().await?;
    info!("Logged in to device {}", device_id);

    let outcome = run(&client, &args.command, &device_id).await;

    if let Err(e) = client.logout().await {
        warn!("Logout failed: {}", e);
    }

    if let Err(e) = &outcome {
        error!("Probe failed: {}", e);
    }
    outcome
}

fn load_config(args: &Args) -> Result<ArrayConfig> {
    let mut config = match &args.config {
        Some(path) => ArrayConfig::load_yaml_file(path)?,
        None => ArrayConfig::default(),
    };

    if let Some(rest_url) = &args.rest_url {
        config.rest_url = rest_url.clone();
    }
    if let Some(username) = &args.username {
        config.username = username.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn run(client: &ArrayClient, command: &Command, device_id: &str) -> Result<()> {
    match command {
        Command::Login => print_json(&serde_json::json!({ "deviceid": device_id })),
        Command::Info => print_json(&client.get_array_info().await?),
        Command::Pools { name: Some(name) } => match client.find_pool_info(name).await? {
            Some(pool) => print_json(&pool),
            None => Err(Error::InvalidInput(format!("No file pool named {}", name))),
        },
        Command::Pools { name: None } => print_json(&client.find_all_pool_info().await?),
        Command::Qos => {
            let policies: Vec<QosPolicy> = client.get_qos().await?.into_list("Get QoS information error.")?;
            print_json(&policies)
        }
        Command::Ports { name: Some(name), bond } => {
            let port_type = if *bond { PORT_TYPE_BOND } else { PORT_TYPE_ETH };
            match client.get_port_id(name, port_type).await? {
                Some(id) => print_json(&serde_json::json!({ "ID": id })),
                None => Err(Error::InvalidInput(format!("No port named {}", name))),
            }
        }
        Command::Ports { name: None, .. } => print_json(&serde_json::json!({
            "eth": client.get_all_eth_port().await?,
            "bond": client.get_all_bond_port().await?,
        })),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn", "rustls=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    // Logs go to stderr so stdout carries only query results
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
