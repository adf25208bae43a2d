use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod backend;
mod config;
mod handler;
mod tui;
mod typeset;
mod ui;

use app::App;
use backend::BackendClient;
use config::{Config, DEFAULT_BACKEND_URL};

#[derive(Parser)]
#[command(name = "mathprof", version)]
#[command(about = "Terminal chat client for a math question-answering backend")]
struct Cli {
    /// Backend origin, e.g. http://localhost:8000 (overrides the config file)
    #[arg(long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|_| Config::new());

    init_logging()?;

    let backend_url = match cli.backend_url {
        Some(url) => {
            // A flag-selected backend becomes the saved default, the same
            // way other settings changes persist.
            let mut config = config;
            config.backend_url = Some(url.clone());
            if let Err(e) = config.save() {
                tracing::warn!("could not save config: {}", e);
            }
            url
        }
        None => config
            .backend_url
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
    };
    tracing::info!("starting against backend {}", backend_url);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = tui::EventHandler::new();
    let mut app = App::new(BackendClient::new(&backend_url));

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event)?;
        }

        // Settle a finished request; ticks keep this prompt.
        app.poll_ask_task().await;
    }

    tui::restore()?;
    Ok(())
}

/// Log to a file under the config dir: stderr hosts the TUI, so diagnostics
/// cannot go to the terminal.
fn init_logging() -> Result<()> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join("mathprof");
    std::fs::create_dir_all(&dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("mathprof.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
