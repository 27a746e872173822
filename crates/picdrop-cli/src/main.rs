//! Picdrop CLI: command-line client for the Picdrop intake service.
//!
//! Set PICDROP_API_URL (default http://localhost:3000) and optionally PICDROP_UPLOAD_PATH.

use anyhow::Context;
use clap::{Parser, Subcommand};
use picdrop_api_client::{ApiClient, ImageSelection, UploadForm};
use picdrop_cli::{init_tracing, parse_command, SessionCommand, SESSION_HELP};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "picdrop", about = "Upload images to a Picdrop server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one image and print its URL as JSON
    Upload {
        /// Path to the image file
        file: std::path::PathBuf,
    },
    /// Select and upload images interactively
    Interactive,
    /// Check that the server is up and can store uploads
    Health,
}

#[derive(Serialize)]
struct UploadOutput<'a> {
    url: &'a str,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let client = ApiClient::from_env()?;

    match cli.command {
        Commands::Upload { file } => {
            let mut form = UploadForm::new();
            form.select(ImageSelection::load(&file).await?);
            match form.submit(&client).await {
                Ok(url) => print_json(&UploadOutput { url: &url })?,
                Err(e) => {
                    eprintln!("{}", e.notification());
                    return Err(anyhow::Error::new(e)
                        .context(format!("Uploading {}", file.display())));
                }
            }
        }
        Commands::Interactive => run_session(&client).await?,
        Commands::Health => {
            let health = client.health().await.context("Health check failed")?;
            println!(
                "status: {}, upload root writable: {}",
                health.status, health.upload_root_writable
            );
        }
    }

    Ok(())
}

async fn run_session(client: &ApiClient) -> anyhow::Result<()> {
    let mut form = UploadForm::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("picdrop session against {} (type 'help')", client.upload_url());

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            SessionCommand::Select(path) => match ImageSelection::load(&path).await {
                Ok(selection) => {
                    println!(
                        "selected {} ({} bytes)",
                        selection.file_name(),
                        selection.len()
                    );
                    form.select(selection);
                }
                Err(e) => println!("{}", e),
            },
            SessionCommand::Upload => match form.submit(client).await {
                Ok(url) => println!("{}", url),
                Err(e) => {
                    tracing::debug!(error = %e, "Upload attempt failed");
                    println!("{}", e.notification());
                }
            },
            SessionCommand::Clear => {
                form.clear();
                println!("selection cleared");
            }
            SessionCommand::Status => {
                match form.selection() {
                    Some(selection) => println!(
                        "selected: {} ({} bytes)",
                        selection.file_name(),
                        selection.len()
                    ),
                    None => println!("selected: none"),
                }
                if let Some(url) = form.last_url() {
                    println!("last url: {}", url);
                }
            }
            SessionCommand::Help => println!("{}", SESSION_HELP),
            SessionCommand::Quit => break,
        }
    }

    Ok(())
}
