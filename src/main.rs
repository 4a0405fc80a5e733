use std::path::PathBuf;
use std::sync::Arc;

use annostudio::api::{ApiError, HttpStore, RemoteStore};
use annostudio::config::{ConfigError, StudioConfig};
use annostudio::session::{AnnotationSession, SessionError, SessionInput};
use canvas::doc::export_json;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to read {path}: {source}")]
    ReadScript { path: PathBuf, source: std::io::Error },
    #[error("script line {line}: {source}")]
    Script { line: usize, source: serde_json::Error },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "annostudio", about = "Bounding-box annotation studio")]
struct Cli {
    #[arg(long, env = "ANNOSTUDIO_BASE_URL")]
    base_url: Option<String>,

    /// Autosave quiescence window in milliseconds.
    #[arg(long, env = "ANNOSTUDIO_AUTOSAVE_MS")]
    autosave_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an image's annotations to `annotations_{image}.json`.
    Export {
        #[arg(long)]
        project: String,
        #[arg(long)]
        image: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Append auto-detected boxes to an image and save.
    Predict {
        #[arg(long)]
        project: String,
        #[arg(long)]
        image: String,
    },
    /// Print a project's class vocabulary.
    Classes {
        #[arg(long)]
        project: String,
    },
    /// Drive a session from a JSON-lines input script and print the result.
    Replay {
        #[arg(long)]
        project: String,
        #[arg(long)]
        image: String,
        #[arg(long)]
        script: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = StudioConfig::from_env()?.with_overrides(cli.base_url.as_deref(), cli.autosave_ms)?;
    let store: Arc<dyn RemoteStore> = Arc::new(HttpStore::new(&config.base_url, config.timeouts)?);
    info!(base_url = %config.base_url, autosave_ms = config.autosave_ms, "annostudio starting");

    match cli.command {
        Command::Export { project, image, out } => run_export(store, &config, &project, &image, &out).await,
        Command::Predict { project, image } => run_predict(store, &config, &project, &image).await,
        Command::Classes { project } => run_classes(store.as_ref(), &project).await,
        Command::Replay { project, image, script } => run_replay(store, &config, &project, &image, &script).await,
    }
}

async fn run_export(
    store: Arc<dyn RemoteStore>,
    config: &StudioConfig,
    project: &str,
    image: &str,
    out: &std::path::Path,
) -> Result<(), CliError> {
    let mut session = AnnotationSession::new(store, config);
    session.open(project, image).await;
    let path = session.export_to(out).await?;
    session.close().await;
    println!("{}", path.display());
    Ok(())
}

async fn run_predict(
    store: Arc<dyn RemoteStore>,
    config: &StudioConfig,
    project: &str,
    image: &str,
) -> Result<(), CliError> {
    let mut session = AnnotationSession::new(store, config);
    session.open(project, image).await;
    let before = session.annotations().len();
    session.predict().await?;
    let added = session.annotations().len().saturating_sub(before);
    let status = session.close().await;
    println!("added {added} boxes; saves completed {} failed {}", status.completed, status.failed);
    Ok(())
}

async fn run_classes(store: &dyn RemoteStore, project: &str) -> Result<(), CliError> {
    for class in store.load_classes(project).await? {
        println!("{class}");
    }
    Ok(())
}

async fn run_replay(
    store: Arc<dyn RemoteStore>,
    config: &StudioConfig,
    project: &str,
    image: &str,
    script: &std::path::Path,
) -> Result<(), CliError> {
    let text = tokio::fs::read_to_string(script)
        .await
        .map_err(|source| CliError::ReadScript { path: script.to_path_buf(), source })?;
    let inputs = parse_script(&text)?;

    let mut session = AnnotationSession::new(store, config);
    session.open(project, image).await;
    for (index, input) in inputs.into_iter().enumerate() {
        if let Err(e) = session.apply(input).await {
            warn!(step = index + 1, error = %e, "replay step failed; continuing");
        }
    }

    let json = export_json(session.annotations())?;
    let status = session.close().await;
    info!(completed = status.completed, failed = status.failed, "replay finished");
    println!("{json}");
    Ok(())
}

/// One input per line; blank lines and `#` comments are skipped.
fn parse_script(text: &str) -> Result<Vec<SessionInput>, CliError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| serde_json::from_str(line).map_err(|source| CliError::Script { line: index + 1, source }))
        .collect()
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
