#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for checking accounts against an IMAP server

use anyhow::Context;
use clap::{Parser, Subcommand};
use imap_account_backend::{
    Account, Connector, ImapConfig, ImapUsers, ProtocolSession, UsersBackend,
};
use std::env;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imap-accounts")]
#[command(about = "Log in to an IMAP server and inspect the resulting account")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Username to log in with (default: $IMAP_USERNAME)
    #[arg(long, global = true)]
    username: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and show the account with its quota
    Auth,

    /// Log in and show the server capabilities the backend uses
    Capabilities,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ImapConfig::from_env()?;

    let username = match &args.username {
        Some(username) => username.clone(),
        None => env::var("IMAP_USERNAME").context("IMAP_USERNAME not set")?,
    };
    let password = env::var("IMAP_PASSWORD").context("IMAP_PASSWORD not set")?;

    let users = ImapUsers::from_config(config);
    let account = users.auth(&username, &password).await?;

    match args.command {
        Command::Auth => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(account.as_ref())?);
            } else {
                print_account(&account);
            }
        }
        Command::Capabilities => {
            let capabilities = users.connector().session(&account.id).await?.capabilities();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&capabilities)?);
            } else {
                println!("QUOTA:     {}", yes_no(capabilities.quota));
                println!("IDLE:      {}", yes_no(capabilities.idle));
                println!("STARTTLS:  {}", yes_no(capabilities.starttls));
                println!("NAMESPACE: {}", yes_no(capabilities.namespace));
            }
        }
    }

    Ok(())
}

fn print_account(account: &Account) {
    println!("ID:      {}", account.id);
    println!("Name:    {}", account.display_name);
    if let Some(address) = account.primary_address() {
        println!("Address: {}", address.email);
    }

    if account.max_space == 0 {
        println!("Quota:   unknown");
    } else {
        println!(
            "Quota:   {} / {} ({})",
            human_bytes(account.used_space),
            human_bytes(account.max_space),
            percent(account.used_space, account.max_space),
        );
    }
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[allow(clippy::cast_precision_loss)]
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(used: u64, max: u64) -> String {
    format!("{:.1}%", used as f64 * 100.0 / max as f64)
}
