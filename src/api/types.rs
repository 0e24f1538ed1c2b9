//! Wire-level product records.

use serde::{Deserialize, Serialize};

/// A product record as the server (or the cache) hands it to us, before
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
  pub name: String,
  #[serde(rename = "type")]
  pub product_type: String,
  #[serde(rename = "expiryDate", default)]
  pub expiry_date: Option<String>,
  pub price: f64,
}

#[cfg(test)]
impl RawProduct {
  pub fn new(
    name: impl Into<String>,
    product_type: impl Into<String>,
    expiry_date: Option<&str>,
    price: f64,
  ) -> Self {
    Self {
      name: name.into(),
      product_type: product_type.into(),
      expiry_date: expiry_date.map(String::from),
      price,
    }
  }
}
