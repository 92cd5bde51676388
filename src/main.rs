//! CLI entry point for the Scribd API client.

use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scribd_client::methods::{docs, thumbnail};
use scribd_client::{ClientConfig, Credentials, Params, ScribdClient};
use serde_json::{Value, json};
use tracing::{debug, info};

mod cli;

use cli::{Args, Command};

/// Environment fallback for `login --password`.
const PASSWORD_ENV: &str = "SCRIBD_PASSWORD";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    debug!(?args, "CLI arguments parsed");

    let client = build_client(&args)?;
    let output = run_command(&client, &args).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn build_client(args: &Args) -> Result<ScribdClient> {
    let mut credentials =
        Credentials::from_env().context("API credentials are required")?;
    if let Some(session_key) = &args.session_key {
        credentials = credentials.with_session_key(session_key);
    }

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &args.base_url {
        config.base_url.clone_from(base_url);
    }

    Ok(ScribdClient::new(credentials, config)?)
}

async fn run_command(client: &ScribdClient, args: &Args) -> Result<Value> {
    let output = match &args.command {
        Command::Upload {
            file,
            doc_type,
            access,
            rev_id,
            wait,
        } => {
            let upload = client
                .upload(file, doc_type.as_deref(), access.as_deref(), *rev_id)
                .await?;
            info!(doc_id = %upload.doc_id, "upload accepted");
            if *wait {
                wait_for_conversion(client, &upload.doc_id, args.quiet).await?;
            }
            upload_json(&upload)
        }
        Command::UploadUrl {
            url,
            doc_type,
            access,
            wait,
        } => {
            let upload = client
                .upload_from_url(url, doc_type.as_deref(), access.as_deref(), None)
                .await?;
            info!(doc_id = %upload.doc_id, "upload accepted");
            if *wait {
                wait_for_conversion(client, &upload.doc_id, args.quiet).await?;
            }
            upload_json(&upload)
        }
        Command::Status { doc_id } => {
            let status = client.conversion_status(doc_id).await?;
            json!({ "doc_id": doc_id, "conversion_status": status.as_str() })
        }
        Command::Search {
            query,
            num_results,
            start,
            scope,
        } => Value::Array(
            client
                .search(query, *num_results, *start, scope.as_deref())
                .await?,
        ),
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password.clone(),
                None => std::env::var(PASSWORD_ENV)
                    .with_context(|| format!("pass --password or set {PASSWORD_ENV}"))?,
            };
            client.login(username, &password).await?
        }
        Command::Settings { doc_id } => {
            client
                .call(docs::get_settings(doc_id, Params::new()))
                .await?
        }
        Command::Thumbnail {
            doc_id,
            width,
            height,
        } => {
            client
                .call(thumbnail::get(doc_id, *width, *height, Params::new()))
                .await?
        }
        Command::DownloadUrl { doc_id, doc_type } => {
            client
                .call(docs::get_download_url(
                    doc_id,
                    doc_type.as_deref(),
                    Params::new(),
                ))
                .await?
        }
    };
    Ok(output)
}

fn upload_json(upload: &scribd_client::UploadResult) -> Value {
    json!({
        "doc_id": upload.doc_id,
        "access_key": upload.access_key,
        "secret_password": upload.secret_password,
    })
}

async fn wait_for_conversion(client: &ScribdClient, doc_id: &str, quiet: bool) -> Result<()> {
    let spinner = (!quiet && io::stderr().is_terminal()).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Converting document {doc_id}..."));
        spinner
    });

    let event = client.wait_for_conversion(doc_id).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    if let Some(error) = event.error {
        bail!("conversion of document {doc_id} did not finish: {error}");
    }
    info!(doc_id, "conversion finished");
    Ok(())
}

