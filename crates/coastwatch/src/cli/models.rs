//! The `coastwatch models` command for managing AI models.

use std::path::Path;

use clap::{Args, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use coastwatch_core::{ClipMatcher, Config};

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download required models (CLIP vision + text encoder + tokenizer)
    Download,

    /// List installed model files
    List,

    /// Show model directory path
    Path,
}

/// Hugging Face repository holding the ONNX export of CLIP ViT-B/32.
const CLIP_REPO: &str = "Xenova/clip-vit-base-patch32";

/// (remote path in repo, local filename) pairs.
const MODEL_FILES: &[(&str, &str)] = &[
    ("onnx/vision_model.onnx", "vision_model.onnx"),
    ("onnx/text_model.onnx", "text_model.onnx"),
    ("tokenizer.json", "tokenizer.json"),
];

/// Execute the models command.
pub async fn execute(args: ModelsArgs) -> anyhow::Result<()> {
    let config = Config::load()?;

    match args.command {
        ModelsCommand::Download => download_all(&config).await,
        ModelsCommand::List => {
            let model_dir = config.model_dir();
            println!("Model directory: {}", model_dir.display());
            for path in ClipMatcher::model_paths(&config.model, &model_dir) {
                let status = if path.exists() {
                    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                    format!("installed ({:.1} MB)", size as f64 / (1024.0 * 1024.0))
                } else {
                    "missing".to_string()
                };
                println!("  {}: {}", path.display(), status);
            }
            if ClipMatcher::model_exists(&config.model, &model_dir) {
                println!("\nReady to classify.");
            } else {
                println!("\nRun `coastwatch models download` to fetch missing files.");
            }
            Ok(())
        }
        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
            Ok(())
        }
    }
}

/// Download all model files, skipping any already present.
async fn download_all(config: &Config) -> anyhow::Result<()> {
    let variant_dir = config.model_dir().join(&config.model.model);
    std::fs::create_dir_all(&variant_dir)?;

    let client = reqwest::Client::new();

    for (remote, local) in MODEL_FILES {
        let dest = variant_dir.join(local);
        if dest.exists() {
            tracing::info!("{} already exists at {:?}", local, dest);
            continue;
        }

        let url = format!("https://huggingface.co/{CLIP_REPO}/resolve/main/{remote}");
        tracing::info!("Downloading {local}...");
        tracing::info!("  Source: {url}");
        tracing::info!("  Destination: {:?}", dest);

        download_file(&client, &url, &dest).await?;

        let file_size = std::fs::metadata(&dest)?.len();
        tracing::info!(
            "  {} complete ({:.1} MB)",
            local,
            file_size as f64 / (1024.0 * 1024.0)
        );
    }

    println!("Models ready in {}", variant_dir.display());
    Ok(())
}

/// Stream a file to disk with a progress bar.
///
/// Downloads to a `.part` file and renames on completion so an interrupted
/// download never leaves a truncated model behind.
async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    let total_size = response.content_length();
    let bar = match total_size {
        Some(size) => {
            let bar = ProgressBar::new(size);
            bar.set_style(
                ProgressStyle::with_template(
                    "  [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                )?
                .progress_chars("=>-"),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    };

    let part = dest.with_extension("part");
    let mut file = tokio::fs::File::create(&part).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        bar.inc(chunk.len() as u64);
    }

    file.flush().await?;
    drop(file);
    bar.finish_and_clear();

    tokio::fs::rename(&part, dest).await?;
    Ok(())
}
