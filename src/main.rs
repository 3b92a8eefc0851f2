mod core;
#[cfg(test)]
mod test_support;
mod tui;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, File};
use std::path::PathBuf;

use crate::core::config::{load_config, nook_dir, resolve};

#[derive(Parser)]
#[command(name = "nook", about = "Terminal workspace for local model chats")]
struct Args {
    /// Model for new conversations (overrides config and NOOK_DEFAULT_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Workspace file to load and save
    #[arg(short, long)]
    workspace: Option<PathBuf>,
}

fn log_path() -> PathBuf {
    match nook_dir() {
        Some(dir) if fs::create_dir_all(&dir).is_ok() => dir.join("nook.log"),
        _ => PathBuf::from("nook.log"),
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // File logger; the terminal belongs to the UI
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(log_path()) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let config = load_config().map_err(|e| {
        log::error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;
    let resolved = resolve(&config, args.model.as_deref(), args.workspace.as_deref());

    log::info!(
        "Nook starting up with workspace {}",
        resolved.workspace_file.display()
    );

    tui::run(resolved)
}
