//! Product loading pipeline.
//!
//! `ProductLoader` fetches from the remote source, classifies the records and
//! publishes a `DisplayState`. Successful fetches are written to the cache in
//! the background; when the server is unreachable the cached copy is shown
//! instead.
//!
//! Concurrent loads are independent attempts. Whichever publishes last wins.

use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::client::ProductSource;
use crate::api::types::RawProduct;
use crate::cache::ProductStore;
use crate::error::{FetchError, LoadError, StoreError};
use crate::products::{self, Product};

/// The outcome of a load or import, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
  ProductList(Vec<Product>),
  ServerError,
  ServerNoProducts,
  OfflineNoProducts,
}

/// Single-slot publish/subscribe cell. Each publish replaces the previous
/// value; subscribers only ever see the latest one.
#[derive(Debug, Clone)]
pub struct StateCell<T> {
  tx: Arc<watch::Sender<Option<T>>>,
}

impl<T: Clone> StateCell<T> {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(None);
    Self { tx: Arc::new(tx) }
  }

  /// Replace the current value. Works with or without subscribers.
  pub fn publish(&self, value: T) {
    self.tx.send_replace(Some(value));
  }

  pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
    self.tx.subscribe()
  }

  /// `None` until something has been published.
  pub fn current(&self) -> Option<T> {
    self.tx.borrow().clone()
  }
}

impl<T: Clone> Default for StateCell<T> {
  fn default() -> Self {
    Self::new()
  }
}

/// Result of one `load_product_data` call.
#[derive(Debug)]
pub struct LoadOutcome {
  /// What was published.
  pub state: DisplayState,
  /// The background cache write, if one was started. Failures are logged,
  /// never surfaced; awaiting this is optional.
  pub cache_write: Option<JoinHandle<()>>,
}

/// Coordinates fetch, fallback, classification and publication.
#[derive(Clone)]
pub struct ProductLoader {
  source: Arc<dyn ProductSource>,
  store: Arc<dyn ProductStore>,
  state: StateCell<DisplayState>,
  in_flight: Arc<AtomicUsize>,
}

impl ProductLoader {
  pub fn new(source: Arc<dyn ProductSource>, store: Arc<dyn ProductStore>) -> Self {
    Self {
      source,
      store,
      state: StateCell::new(),
      in_flight: Arc::new(AtomicUsize::new(0)),
    }
  }

  pub fn state(&self) -> &StateCell<DisplayState> {
    &self.state
  }

  pub fn store(&self) -> &Arc<dyn ProductStore> {
    &self.store
  }

  /// Number of loads currently running.
  pub fn in_flight(&self) -> usize {
    self.in_flight.load(Ordering::SeqCst)
  }

  /// Publish products parsed from literal rows, bypassing the network and
  /// the cache. Nothing is published if any row is malformed.
  pub fn import_product_data(&self, rows: &[Vec<Value>]) -> Result<(), LoadError> {
    let products = products::from_data_rows(rows)?;
    info!(count = products.len(), "imported products");
    self.state.publish(DisplayState::ProductList(products));
    Ok(())
  }

  /// Run one load on its own task.
  pub fn spawn_load(&self) -> JoinHandle<Result<LoadOutcome, LoadError>> {
    let loader = self.clone();
    tokio::spawn(async move { loader.load_product_data().await })
  }

  /// Fetch, classify and publish products, falling back to the cache when
  /// the server is unreachable.
  pub async fn load_product_data(&self) -> Result<LoadOutcome, LoadError> {
    let _guard = InFlightGuard::enter(&self.in_flight);

    let outcome = match self.source.fetch_all().await {
      Ok(raws) if raws.is_empty() => {
        info!("server returned no products");
        self.settle(DisplayState::ServerNoProducts, None)
      }
      Ok(raws) => {
        let products = products::classify_all(&raws)?;
        info!(count = products.len(), "loaded products from server");
        let state = DisplayState::ProductList(products);
        self.state.publish(state.clone());
        let cache_write = self.write_cache(raws);
        LoadOutcome {
          state,
          cache_write: Some(cache_write),
        }
      }
      Err(FetchError::Connectivity(e)) => {
        warn!(error = %e, "server unreachable, falling back to cache");
        self.load_from_cache().await?
      }
      Err(e) => {
        warn!(error = %e, "failed to load products");
        self.settle(DisplayState::ServerError, None)
      }
    };

    Ok(outcome)
  }

  async fn load_from_cache(&self) -> Result<LoadOutcome, LoadError> {
    let store = Arc::clone(&self.store);
    let cached = match tokio::task::spawn_blocking(move || store.read_all()).await? {
      Ok(cached) => cached,
      Err(e) => {
        warn!(error = %e, "failed to read product cache");
        None
      }
    };

    let state = match cached {
      Some(raws) if !raws.is_empty() => {
        let products = products::classify_all(&raws)?;
        info!(count = products.len(), "loaded products from cache");
        DisplayState::ProductList(products)
      }
      Some(_) => DisplayState::OfflineNoProducts,
      None => {
        debug!("product cache unavailable");
        DisplayState::OfflineNoProducts
      }
    };

    Ok(self.settle(state, None))
  }

  fn settle(&self, state: DisplayState, cache_write: Option<JoinHandle<()>>) -> LoadOutcome {
    self.state.publish(state.clone());
    LoadOutcome { state, cache_write }
  }

  /// Replace the cache with the raw records of a successful fetch.
  fn write_cache(&self, raws: Vec<RawProduct>) -> JoinHandle<()> {
    let store = Arc::clone(&self.store);
    tokio::spawn(async move {
      let count = raws.len();
      let result = tokio::task::spawn_blocking(move || store.replace_all(&raws))
        .await
        .map_err(StoreError::from)
        .and_then(|r| r);

      match result {
        Ok(()) => debug!(count, "cached products"),
        Err(e) => warn!(error = %e, "failed to cache products"),
      }
    })
  }
}

/// Counts a running load for as long as it is alive.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
  fn enter(counter: &'a AtomicUsize) -> Self {
    counter.fetch_add(1, Ordering::SeqCst);
    Self(counter)
  }
}

impl Drop for InFlightGuard<'_> {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::SeqCst);
  }
}
