//! Product cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::api::types::RawProduct;
use crate::error::StoreError;

/// Trait for product cache backends.
///
/// The cached collection is only ever replaced wholesale. Calls block, so
/// async callers should run them on a blocking thread.
pub trait ProductStore: Send + Sync {
  /// Atomically replace every cached product with `products`.
  fn replace_all(&self, products: &[RawProduct]) -> Result<(), StoreError>;

  /// Read every cached product.
  ///
  /// `None` means the store could not be initialized; an initialized but
  /// empty store yields `Some(vec![])`.
  fn read_all(&self) -> Result<Option<Vec<RawProduct>>, StoreError>;

  /// When the collection was last replaced.
  fn replaced_at(&self) -> Result<Option<DateTime<Utc>>, StoreError>;
}

/// Store used when no cache could be opened (or caching is disabled).
pub struct UnavailableStore;

impl ProductStore for UnavailableStore {
  fn replace_all(&self, _products: &[RawProduct]) -> Result<(), StoreError> {
    Err(StoreError::Unavailable)
  }

  fn read_all(&self) -> Result<Option<Vec<RawProduct>>, StoreError> {
    Ok(None)
  }

  fn replaced_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
    Ok(None)
  }
}

/// SQLite-based product cache.
pub struct SqliteProductStore {
  conn: Mutex<Connection>,
}

impl SqliteProductStore {
  /// Open (or create) the cache database at `path`.
  pub fn open(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    debug!(path = %path.display(), "opened product cache");
    Self::with_connection(conn)
  }

  /// Open a private in-memory cache.
  pub fn open_in_memory() -> Result<Self, StoreError> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self, StoreError> {
    conn.execute_batch(CACHE_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
    self
      .conn
      .lock()
      .map_err(|e| StoreError::Lock(e.to_string()))
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    product_type TEXT NOT NULL,
    expiry_date TEXT,
    price REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS cache_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

const REPLACED_AT_KEY: &str = "replaced_at";

impl ProductStore for SqliteProductStore {
  fn replace_all(&self, products: &[RawProduct]) -> Result<(), StoreError> {
    let mut conn = self.lock()?;

    // Dropping the transaction without commit rolls back, so an error anywhere
    // below leaves the previous collection intact.
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM products", [])?;

    {
      let mut insert = tx.prepare(
        "INSERT INTO products (name, product_type, expiry_date, price) VALUES (?, ?, ?, ?)",
      )?;
      for product in products {
        insert.execute(params![
          product.name,
          product.product_type,
          product.expiry_date,
          product.price
        ])?;
      }
    }

    tx.execute(
      "INSERT OR REPLACE INTO cache_meta (key, value) VALUES (?, ?)",
      params![REPLACED_AT_KEY, Utc::now().to_rfc3339()],
    )?;

    tx.commit()?;
    debug!(count = products.len(), "replaced cached products");

    Ok(())
  }

  fn read_all(&self) -> Result<Option<Vec<RawProduct>>, StoreError> {
    let conn = self.lock()?;

    let mut stmt =
      conn.prepare("SELECT name, product_type, expiry_date, price FROM products ORDER BY id")?;

    let products = stmt
      .query_map([], |row| {
        Ok(RawProduct {
          name: row.get(0)?,
          product_type: row.get(1)?,
          expiry_date: row.get(2)?,
          price: row.get(3)?,
        })
      })?
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(products))
  }

  fn replaced_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
    let conn = self.lock()?;

    let value: Option<String> = conn
      .query_row(
        "SELECT value FROM cache_meta WHERE key = ?",
        params![REPLACED_AT_KEY],
        |row| row.get(0),
      )
      .optional()?;

    // An unparsable timestamp only loses the "cached at" hint.
    Ok(value.and_then(|s| parse_datetime(&s)))
  }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .ok()
}
