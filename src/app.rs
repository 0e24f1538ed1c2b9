use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::loader::{DisplayState, ProductLoader};
use crate::ui;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Main application state
pub struct App {
  /// Application configuration
  config: Config,

  /// Product pipeline
  loader: ProductLoader,

  /// Last state published by the loader
  state: Option<DisplayState>,

  /// Selected row in the product list
  selected: usize,

  /// When the cache was last refreshed
  cached_at: Option<DateTime<Utc>>,

  /// Last hard load failure, shown in the status bar
  error: Option<String>,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, loader: ProductLoader) -> Self {
    let (tx, _rx) = mpsc::unbounded_channel();

    Self {
      config,
      state: loader.state().current(),
      loader,
      selected: 0,
      cached_at: None,
      error: None,
      event_tx: tx,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();
    let mut state_rx = self.loader.state().subscribe();

    self.refresh_cached_at().await;
    self.reload();

    let result = loop {
      if self.should_quit {
        break Ok(());
      }

      if let Err(e) = terminal.draw(|frame| ui::draw(frame, self)) {
        break Err(e.into());
      }

      tokio::select! {
        event = events.next() => match event {
          Some(event) => self.handle_event(event),
          None => break Ok(()),
        },
        changed = state_rx.changed() => {
          if changed.is_err() {
            break Ok(());
          }
          let state = state_rx.borrow_and_update().clone();
          self.on_state_changed(state).await;
        }
      }
    };

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  /// Start a load in the background. Hard failures come back as events.
  fn reload(&mut self) {
    self.error = None;
    let handle = self.loader.spawn_load();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let message = match handle.await {
        Ok(Ok(_)) => return,
        Ok(Err(e)) => e.to_string(),
        Err(e) => e.to_string(),
      };
      error!(error = %message, "product load failed");
      let _ = tx.send(Event::LoadFailed(message));
    });
  }

  async fn on_state_changed(&mut self, state: Option<DisplayState>) {
    let len = match &state {
      Some(DisplayState::ProductList(products)) => products.len(),
      _ => 0,
    };
    self.selected = self.selected.min(len.saturating_sub(1));
    self.state = state;
    self.refresh_cached_at().await;
  }

  async fn refresh_cached_at(&mut self) {
    let store = Arc::clone(self.loader.store());
    match tokio::task::spawn_blocking(move || store.replaced_at()).await {
      Ok(Ok(cached_at)) => self.cached_at = cached_at,
      Ok(Err(e)) => warn!(error = %e, "failed to read cache timestamp"),
      Err(e) => warn!(error = %e, "cache timestamp task failed"),
    }
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::LoadFailed(message) => self.error = Some(message),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }
      KeyCode::Char('r') => self.reload(),
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      _ => {}
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.products_len();
    if len > 0 {
      self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  fn products_len(&self) -> usize {
    match &self.state {
      Some(DisplayState::ProductList(products)) => products.len(),
      _ => 0,
    }
  }

  // Accessors for UI rendering
  pub fn display_state(&self) -> Option<&DisplayState> {
    self.state.as_ref()
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn is_loading(&self) -> bool {
    self.loader.in_flight() > 0
  }

  pub fn cached_at(&self) -> Option<DateTime<Utc>> {
    self.cached_at
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn title(&self) -> String {
    self.config.title()
  }

  pub fn endpoint(&self) -> String {
    self
      .config
      .endpoint_url()
      .map(|url| url.to_string())
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::client::ProductSource;
  use crate::api::types::RawProduct;
  use crate::cache::UnavailableStore;
  use crate::dataset;
  use crate::error::FetchError;
  use async_trait::async_trait;

  struct Unused;

  #[async_trait]
  impl ProductSource for Unused {
    async fn fetch_all(&self) -> std::result::Result<Vec<RawProduct>, FetchError> {
      Ok(Vec::new())
    }
  }

  fn app_with_demo_data() -> App {
    let loader = ProductLoader::new(Arc::new(Unused), Arc::new(UnavailableStore));
    loader.import_product_data(&dataset::demo_rows()).unwrap();
    App::new(Config::default(), loader)
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_selection_wraps() {
    let mut app = app_with_demo_data();
    assert_eq!(app.selected(), 0);

    app.handle_key(key(KeyCode::Char('k')));
    assert_eq!(app.selected(), 7);

    app.handle_key(key(KeyCode::Down));
    assert_eq!(app.selected(), 0);
  }

  #[test]
  fn test_quit_keys() {
    let mut app = app_with_demo_data();
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_state_change_clamps_selection() {
    let mut app = app_with_demo_data();
    app.selected = 5;

    app
      .on_state_changed(Some(DisplayState::OfflineNoProducts))
      .await;

    assert_eq!(app.selected(), 0);
    assert_eq!(app.display_state(), Some(&DisplayState::OfflineNoProducts));
    assert_eq!(app.cached_at(), None);
  }

  #[test]
  fn test_load_failure_is_shown() {
    let mut app = app_with_demo_data();
    app.handle_event(Event::LoadFailed("bad product".to_string()));
    assert_eq!(app.error(), Some("bad product"));
  }
}
