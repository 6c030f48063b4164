//! MailRelay - failover mail relay
//!
//! Main entry point for the mailrelay CLI.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mailrelay::config::{validate_config_result, RelayConfig};
use mailrelay::delivery::FailoverMailer;
use mailrelay::mail::MailRequest;
use mailrelay::server::RelayServer;
use std::path::{Path, PathBuf};
use std::process;

/// MailRelay - deliver mail through the first reachable provider
#[derive(Parser, Debug)]
#[command(name = "mailrelay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/mailrelay/config.yaml)
    #[arg(short, long, env = "MAILRELAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Run the HTTP relay
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Send one mail and print the outcome
    Send {
        /// Sender address
        #[arg(long)]
        from: String,

        /// Recipient (repeatable)
        #[arg(long)]
        to: Vec<String>,

        /// Carbon-copy recipient (repeatable)
        #[arg(long)]
        cc: Vec<String>,

        /// Blind carbon-copy recipient (repeatable)
        #[arg(long)]
        bcc: Vec<String>,

        /// Subject line
        #[arg(short, long)]
        subject: String,

        /// Message body
        #[arg(short, long)]
        text: String,

        /// Send the body as HTML
        #[arg(long)]
        html: bool,
    },

    /// Probe both providers and print their reachability
    Probe,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = mailrelay::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(RelayConfig::default_path);

    match cli.command {
        Commands::Init { force } => handle_init_command(&config_path, force),
        Commands::Serve { bind } => {
            let config = load_config(&config_path)?;
            handle_serve_command(config, bind).await
        }
        Commands::Send {
            from,
            to,
            cc,
            bcc,
            subject,
            text,
            html,
        } => {
            let mut request = MailRequest::new(from, subject, text);
            request.to = to;
            request.cc = cc;
            request.bcc = bcc;
            if html {
                request = request.html();
            }
            handle_send_command(&load_config(&config_path)?, &request).await
        }
        Commands::Probe => handle_probe_command(&load_config(&config_path)?).await,
    }
}

/// Load and validate the configuration
fn load_config(path: &Path) -> anyhow::Result<RelayConfig> {
    let config = RelayConfig::load(path)
        .with_context(|| format!("Run `mailrelay init` to create {}", path.display()))?;
    validate_config_result(&config)?;
    Ok(config)
}

fn handle_init_command(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    RelayConfig::template().save(path)?;

    println!("Created configuration at {}", path.display());
    println!();
    println!("Set SENDGRID_API_KEY and MAILGUN_API_KEY, or add api_key entries,");
    println!("then run `mailrelay serve`.");
    Ok(())
}

async fn handle_serve_command(config: RelayConfig, bind: Option<String>) -> anyhow::Result<()> {
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let mailer = FailoverMailer::from_config(&config)?;

    RelayServer::new(mailer, config.server.max_body_size)
        .run(&addr)
        .await
        .with_context(|| format!("Relay server on {} stopped", addr))?;
    Ok(())
}

async fn handle_send_command(config: &RelayConfig, request: &MailRequest) -> anyhow::Result<()> {
    let mailer = FailoverMailer::from_config(config)?;
    let outcome = mailer.send(request).await?;

    println!("{}", serde_json::to_string_pretty(&outcome.to_response())?);

    if !outcome.is_sent() {
        process::exit(2);
    }
    Ok(())
}

async fn handle_probe_command(config: &RelayConfig) -> anyhow::Result<()> {
    let mailer = FailoverMailer::from_config(config)?;

    for (id, reachable) in mailer.probe_all().await {
        let profile = mailer.providers().get(id);
        let state = if reachable { "reachable" } else { "unreachable" };
        println!("{:<10} {:<12} {}", id.to_string(), state, profile.url());
    }
    Ok(())
}
