mod product_list;
mod renderfns;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  draw_header(frame, chunks[0], app);
  product_list::draw_product_list(
    frame,
    chunks[1],
    app.display_state(),
    app.selected(),
    app.is_loading(),
  );
  draw_status_bar(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
  let mut spans = vec![
    Span::styled(
      format!(" {} ", app.title()),
      Style::default().fg(Color::Black).bg(Color::Cyan),
    ),
    Span::raw(" "),
    Span::styled(app.endpoint(), Style::default().fg(Color::DarkGray)),
  ];

  if let Some(cached_at) = app.cached_at() {
    spans.push(Span::styled(
      format!("  cache: {}", cached_at.format("%Y-%m-%d %H:%M UTC")),
      Style::default().fg(Color::DarkGray),
    ));
  }

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.error() {
    Some(error) => (format!(" error: {}", error), Style::default().fg(Color::Red)),
    None => (
      " r:reload  j/k:nav  q:quit".to_string(),
      Style::default().fg(Color::DarkGray),
    ),
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}
