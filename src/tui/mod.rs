//! Interactive console for syncdash.
//!
//! A persistent shell (header + content + footer) mounts one of the
//! dashboard or job-creation views at a time. Mounting the dashboard
//! starts the telemetry poll loop and leaving it stops it; mounting the
//! job-creation view refreshes the connector catalog once.

mod app;
mod input;
mod ui;

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::AppConfig;
use crate::host::HostApi;
use app::{App, View};

/// How long the startup banner stays up before the shell appears.
const SPLASH_DURATION: Duration = Duration::from_millis(1500);

/// Run the console against the given host.
pub async fn run(host: Arc<dyn HostApi>, config: AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Create app and run
    let mut app = App::new(host, config);
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    terminal.draw(|frame| ui::render_splash(frame))?;
    tokio::time::sleep(SPLASH_DURATION).await;

    app.init();

    // Frame cadence while the dashboard chart is live
    let dashboard_refresh = Duration::from_millis(250);

    loop {
        app.refresh_telemetry().await;
        terminal.draw(|frame| ui::render(frame, app))?;

        // Short timeout on the dashboard so the chart keeps moving; the
        // form view only redraws on input.
        let timeout = if matches!(app.view, View::Dashboard) {
            dashboard_refresh
        } else {
            Duration::from_secs(60)
        };

        if event::poll(timeout)? {
            let event = event::read()?;
            if let Some(action) = input::handle_event(event, &app.view) {
                app.handle_action(action).await;
            }
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}
