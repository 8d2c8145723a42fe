//! quill CLI: upload local files and insert their markup into a markdown document.
//!
//! Set QUILL_API_URL (or API_URL) and, if the endpoint needs one, QUILL_API_KEY.

use anyhow::Context;
use clap::{Parser, Subcommand};
use quill_api_client::HttpUploader;
use quill_cli::{
    classify_files, init_tracing, insert_files, load_files, read_document, truncate_string,
    write_document,
};
use quill_core::IngestConfig;
use quill_ingest::TracingNotifier;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "quill", about = "Upload files and insert them into a markdown document")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files and insert their markup into a document
    Insert {
        /// Files to upload, inserted in this order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Markdown document to edit (created if missing)
        #[arg(long)]
        document: PathBuf,
        /// Byte offset to insert at (default: end of document)
        #[arg(long)]
        cursor: Option<usize>,
        /// How many times to retry failed uploads
        #[arg(long, default_value = "0")]
        retries: usize,
    },
    /// Show how files would be classified and rendered
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Insert {
            files,
            document,
            cursor,
            retries,
        } => {
            let config = IngestConfig::from_env().context("Failed to load configuration")?;
            config.validate().context("Invalid configuration")?;
            let uploader = HttpUploader::from_config(&config)
                .context("Failed to create uploader. Check QUILL_API_URL")?;

            let files = load_files(&files).await?;
            let text = read_document(&document).await?;

            let (text, summary) = insert_files(
                Arc::new(uploader),
                Arc::new(TracingNotifier),
                &text,
                cursor,
                files,
                retries,
            )
            .await;

            if summary.inserted > 0 {
                write_document(&document, &text).await?;
            }
            print_json(&summary)?;

            if !summary.failed.is_empty() {
                anyhow::bail!(
                    "{} file(s) could not be uploaded: {}",
                    summary.failed.len(),
                    summary.failed.join(", ")
                );
            }
        }
        Commands::Classify { files, format } => {
            let files = load_files(&files).await?;
            let classified = classify_files(&files);
            match format.as_str() {
                "json" => print_json(&classified)?,
                _ => {
                    println!("{:<32} {:<28} {:<8} {:>10}", "NAME", "CONTENT TYPE", "CATEGORY", "SIZE");
                    for file in &classified {
                        println!(
                            "{:<32} {:<28} {:<8} {:>10}",
                            truncate_string(&file.name, 32),
                            truncate_string(&file.content_type, 28),
                            file.category.to_string(),
                            file.size
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
