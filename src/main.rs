use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dotenv::dotenv;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use ticklist::app::App;
use ticklist::config::Config;
use ticklist::server;
use ticklist::ui;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from a .env file when present
    dotenv().ok();

    let config = Config::load()?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("serve") => server::run(config.server).await,
        Some("tui") | None => run_tui(config).await,
        Some(other) => {
            eprintln!("unknown command `{other}`; expected `serve` or `tui`");
            std::process::exit(2);
        }
    }
}

async fn run_tui(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let base_url = config.client.server_url.trim_end_matches('/').to_string();

    // Initial load before the terminal takes over the screen
    let mut app = App::new();
    app.refresh(&base_url).await;

    // Setup terminal UI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.hide_cursor()?;

    let res = ui::run_app(&mut terminal, app, &base_url).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}
