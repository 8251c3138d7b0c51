//! UI rendering for the console.

use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph},
};

use crate::core::{ConnectorRole, DraftField, MetricsSample, WINDOW_CAPACITY};

use super::app::{App, FormFocus, View};

/// Main render function - dispatches to view-specific renderers.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/help
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match &app.view {
        View::Dashboard => render_dashboard(frame, app, chunks[1]),
        View::CreateJob { focus } => render_create_job(frame, app, chunks[1], *focus),
    }

    render_footer(frame, app, chunks[2]);
}

/// Startup banner shown before the shell appears.
pub fn render_splash(frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(frame.area());

    let banner = Paragraph::new(vec![
        Line::from(Span::styled(
            "SYNCDASH",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "loading...",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);

    frame.render_widget(banner, chunks[1]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.view {
        View::Dashboard if app.telemetry.current.is_none() => {
            "SYNCDASH  Dashboard  (waiting for daemon)".to_string()
        }
        View::Dashboard => "SYNCDASH  Dashboard".to_string(),
        View::CreateJob { .. } => "SYNCDASH  Create Sync Job".to_string(),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(block, area);
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Headline tiles
            Constraint::Min(0),    // Usage chart
        ])
        .split(area);

    render_stat_tiles(frame, app, chunks[0]);
    render_usage_chart(frame, app, chunks[1]);
}

fn render_stat_tiles(frame: &mut Frame, app: &App, area: Rect) {
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let current = app.telemetry.current;
    render_tile(frame, tiles[0], "CPU", current.map(|s| s.cpu_usage), Color::Cyan);
    render_tile(
        frame,
        tiles[1],
        "Memory",
        current.map(|s| s.memory_usage),
        Color::Green,
    );
    render_tile(
        frame,
        tiles[2],
        "Disk",
        current.map(|s| s.disk_usage),
        Color::Yellow,
    );
}

fn render_tile(frame: &mut Frame, area: Rect, title: &str, value: Option<f32>, color: Color) {
    let block = Block::default().title(title).borders(Borders::ALL);

    match value {
        Some(v) => {
            let gauge = Gauge::default()
                .block(block)
                .gauge_style(Style::default().fg(color))
                .ratio((f64::from(v) / 100.0).clamp(0.0, 1.0))
                .label(format!("{v:.1}%"));
            frame.render_widget(gauge, area);
        }
        None => {
            let text = Paragraph::new("--")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(text, area);
        }
    }
}

fn render_usage_chart(frame: &mut Frame, app: &App, area: Rect) {
    let series = &app.telemetry.series;
    let block = Block::default()
        .title("Usage %")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if series.is_empty() {
        let text = Paragraph::new("  Waiting for samples...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let cpu = metric_points(series, |s| s.cpu_usage);
    let memory = metric_points(series, |s| s.memory_usage);
    let disk = metric_points(series, |s| s.disk_usage);

    let datasets = vec![
        Dataset::default()
            .name("cpu")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&cpu),
        Dataset::default()
            .name("memory")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&memory),
        Dataset::default()
            .name("disk")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&disk),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, (WINDOW_CAPACITY - 1) as f64])
                .labels([time_label(series.first()), time_label(series.last())]),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 100.0])
                .labels(["0", "50", "100"]),
        );

    frame.render_widget(chart, area);
}

fn metric_points(series: &[MetricsSample], metric: fn(&MetricsSample) -> f32) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, f64::from(metric(s))))
        .collect()
}

fn time_label(sample: Option<&MetricsSample>) -> String {
    sample
        .and_then(|s| DateTime::from_timestamp_millis(s.timestamp_ms))
        .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn render_create_job(frame: &mut Frame, app: &App, area: Rect, focus: FormFocus) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Job name
            Constraint::Length(3), // Source connector
            Constraint::Length(3), // Source config
            Constraint::Length(3), // Sink connector
            Constraint::Length(3), // Sink config
            Constraint::Length(3), // Submit
            Constraint::Min(0),    // Problems
        ])
        .split(area);

    render_text_slot(
        frame,
        app,
        chunks[0],
        "Job Name",
        DraftField::JobName,
        focus == FormFocus::JobName,
    );
    render_choice_slot(
        frame,
        app,
        chunks[1],
        "Source Connector",
        ConnectorRole::Source,
        DraftField::SourceConnector,
        focus == FormFocus::SourceConnector,
    );
    render_text_slot(
        frame,
        app,
        chunks[2],
        "Source Config (JSON)",
        DraftField::SourceConfig,
        focus == FormFocus::SourceConfig,
    );
    render_choice_slot(
        frame,
        app,
        chunks[3],
        "Sink Connector",
        ConnectorRole::Sink,
        DraftField::SinkConnector,
        focus == FormFocus::SinkConnector,
    );
    render_text_slot(
        frame,
        app,
        chunks[4],
        "Sink Config (JSON)",
        DraftField::SinkConfig,
        focus == FormFocus::SinkConfig,
    );
    render_submit_slot(frame, chunks[5], focus == FormFocus::Submit);
    render_problems(frame, app, chunks[6]);
}

fn slot_block(title: &str, focused: bool, has_error: bool) -> Block<'_> {
    let border = if has_error {
        Style::default().fg(Color::Red)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border)
}

fn render_text_slot(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    field: DraftField,
    focused: bool,
) {
    let has_error = app.form_errors.iter().any(|e| e.field() == field);
    let value = app.form.field_value(field);
    let cursor = if focused { "▌" } else { "" };

    let paragraph = Paragraph::new(format!("{value}{cursor}"))
        .block(slot_block(title, focused, has_error));
    frame.render_widget(paragraph, area);
}

fn render_choice_slot(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    role: ConnectorRole,
    field: DraftField,
    focused: bool,
) {
    let has_error = app.form_errors.iter().any(|e| e.field() == field);
    let value = app.form.field_value(field);
    let count = app.catalog.by_role(role).count();

    let content = if value.is_empty() {
        Span::styled(
            format!("←/→ to select  ({count} available)"),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(format!("{value}  ({count} available)"))
    };

    let paragraph = Paragraph::new(Line::from(content)).block(slot_block(title, focused, has_error));
    frame.render_widget(paragraph, area);
}

fn render_submit_slot(frame: &mut Frame, area: Rect, focused: bool) {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let paragraph = Paragraph::new(Span::styled(" Create Job ", style))
        .alignment(Alignment::Center)
        .block(slot_block("", focused, false));
    frame.render_widget(paragraph, area);
}

fn render_problems(frame: &mut Frame, app: &App, area: Rect) {
    if app.form_errors.is_empty() {
        return;
    }

    let lines: Vec<Line> = app
        .form_errors
        .iter()
        .map(|e| {
            Line::from(vec![
                Span::styled("✗ ", Style::default().fg(Color::Red)),
                Span::raw(e.to_string()),
            ])
        })
        .collect();

    let block = Block::default()
        .title("Problems")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.view {
        View::Dashboard => "[n] New Job  [q] Quit",
        View::CreateJob { .. } => {
            "[Tab/↑↓] Field  [←/→] Connector  [Enter] Next/Submit  [F5] Reload  [Esc] Back"
        }
    };

    let mut spans = vec![Span::raw(format!("  {}", help_text))];

    if let Some(notice) = &app.notice {
        let color = if notice.is_error {
            Color::Red
        } else {
            Color::Green
        };
        spans.push(Span::styled(
            format!("  {}", notice.text),
            Style::default().fg(color),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
