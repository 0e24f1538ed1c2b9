//! Display-ready products and the classification of raw records into them.

use serde_json::Value;

use crate::api::types::RawProduct;
use crate::error::ClassifyError;

const EQUIPMENT: &str = "Equipment";
const FOOD: &str = "Food";

/// The closed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
  Equipment,
  Food,
}

impl ProductKind {
  /// Exact, case-sensitive match on the wire type name.
  pub fn parse(product_type: &str) -> Option<Self> {
    match product_type {
      EQUIPMENT => Some(Self::Equipment),
      FOOD => Some(Self::Food),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Equipment => EQUIPMENT,
      Self::Food => FOOD,
    }
  }
}

/// Fields shared by every product variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
  pub name: String,
  pub expiry_date: Option<String>,
  pub price: f64,
}

/// A classified product.
#[derive(Debug, Clone, PartialEq)]
pub enum Product {
  Equipment(ProductDetails),
  Food(ProductDetails),
}

impl Product {
  pub fn new(kind: ProductKind, details: ProductDetails) -> Self {
    match kind {
      ProductKind::Equipment => Self::Equipment(details),
      ProductKind::Food => Self::Food(details),
    }
  }

  pub fn kind(&self) -> ProductKind {
    match self {
      Self::Equipment(_) => ProductKind::Equipment,
      Self::Food(_) => ProductKind::Food,
    }
  }

  pub fn details(&self) -> &ProductDetails {
    match self {
      Self::Equipment(details) | Self::Food(details) => details,
    }
  }

  pub fn name(&self) -> &str {
    &self.details().name
  }

  pub fn expiry_date(&self) -> Option<&str> {
    self.details().expiry_date.as_deref()
  }

  pub fn price(&self) -> f64 {
    self.details().price
  }

  /// Build a product from a literal import row:
  /// `[name: string, type: "Equipment" | "Food", expiry: string | null, price: integer]`.
  pub fn from_data_row(row: &[Value]) -> Result<Self, ClassifyError> {
    let [name, product_type, expiry_date, price] = row else {
      return Err(ClassifyError::RowArity {
        row: 0,
        len: row.len(),
      });
    };

    let name = name.as_str().ok_or(ClassifyError::RowField {
      row: 0,
      field: "name",
      expected: "must be a string",
    })?;

    let kind = product_type
      .as_str()
      .and_then(ProductKind::parse)
      .ok_or(ClassifyError::RowField {
        row: 0,
        field: "type",
        expected: "must be either \"Equipment\" or \"Food\"",
      })?;

    let expiry_date = match expiry_date {
      Value::Null => None,
      Value::String(date) => Some(date.clone()),
      _ => {
        return Err(ClassifyError::RowField {
          row: 0,
          field: "expiry date",
          expected: "must be a string or null",
        })
      }
    };

    let price = price
      .as_i64()
      .and_then(|p| i32::try_from(p).ok())
      .ok_or(ClassifyError::RowField {
        row: 0,
        field: "price",
        expected: "must be a 32-bit integer",
      })?;

    Ok(Self::new(
      kind,
      ProductDetails {
        name: name.to_string(),
        expiry_date,
        price: f64::from(price),
      },
    ))
  }
}

/// Classify a single raw record. Anything other than an exact
/// "Equipment" or "Food" type is rejected.
pub fn classify(raw: &RawProduct) -> Result<Product, ClassifyError> {
  let kind = ProductKind::parse(&raw.product_type).ok_or_else(|| ClassifyError::UnknownType {
    name: raw.name.clone(),
    found: raw.product_type.clone(),
  })?;

  Ok(Product::new(
    kind,
    ProductDetails {
      name: raw.name.clone(),
      expiry_date: raw.expiry_date.clone(),
      price: raw.price,
    },
  ))
}

/// Classify a batch, failing on the first bad record.
pub fn classify_all(raws: &[RawProduct]) -> Result<Vec<Product>, ClassifyError> {
  raws.iter().map(classify).collect()
}

/// Parse a batch of literal import rows, failing on the first bad row.
pub fn from_data_rows(rows: &[Vec<Value>]) -> Result<Vec<Product>, ClassifyError> {
  rows
    .iter()
    .enumerate()
    .map(|(i, row)| Product::from_data_row(row).map_err(|e| e.at_row(i)))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn row(value: Value) -> Vec<Value> {
    value.as_array().cloned().unwrap()
  }

  #[test]
  fn test_classify_equipment_preserves_fields() {
    let raw = RawProduct::new("Tent", "Equipment", None, 120.0);
    let product = classify(&raw).unwrap();

    assert_eq!(product.kind(), ProductKind::Equipment);
    assert_eq!(product.name(), "Tent");
    assert_eq!(product.expiry_date(), None);
    assert_eq!(product.price(), 120.0);
  }

  #[test]
  fn test_classify_food_preserves_fields() {
    let raw = RawProduct::new("Jerky", "Food", Some("2025-01-01"), 4.5);

    assert_eq!(
      classify(&raw).unwrap(),
      Product::Food(ProductDetails {
        name: "Jerky".to_string(),
        expiry_date: Some("2025-01-01".to_string()),
        price: 4.5,
      })
    );
  }

  #[test]
  fn test_classify_rejects_other_types() {
    for bad in ["food", "EQUIPMENT", "Drink", "", " Food"] {
      let raw = RawProduct::new("Thing", bad, None, 1.0);
      assert_eq!(
        classify(&raw),
        Err(ClassifyError::UnknownType {
          name: "Thing".to_string(),
          found: bad.to_string(),
        })
      );
    }
  }

  #[test]
  fn test_classify_all_fails_fast() {
    let raws = vec![
      RawProduct::new("Tent", "Equipment", None, 120.0),
      RawProduct::new("Mystery", "Gadget", None, 1.0),
      RawProduct::new("Jerky", "Food", Some("2025-01-01"), 4.5),
    ];

    let err = classify_all(&raws).unwrap_err();
    assert!(matches!(err, ClassifyError::UnknownType { ref name, .. } if name == "Mystery"));
  }

  #[test]
  fn test_classify_all_keeps_order() {
    let raws = vec![
      RawProduct::new("Jerky", "Food", Some("2025-01-01"), 4.5),
      RawProduct::new("Tent", "Equipment", None, 120.0),
    ];

    let products = classify_all(&raws).unwrap();
    let names: Vec<&str> = products.iter().map(Product::name).collect();
    assert_eq!(names, ["Jerky", "Tent"]);
  }

  #[test]
  fn test_from_data_row() {
    let product = Product::from_data_row(&row(json!(["Apple", "Food", "2024-03-01", 2]))).unwrap();
    assert_eq!(product.kind(), ProductKind::Food);
    assert_eq!(product.expiry_date(), Some("2024-03-01"));
    assert_eq!(product.price(), 2.0);

    let product = Product::from_data_row(&row(json!(["Hammer", "Equipment", null, 15]))).unwrap();
    assert_eq!(product.kind(), ProductKind::Equipment);
    assert_eq!(product.expiry_date(), None);
  }

  #[test]
  fn test_from_data_row_accepts_i32_bounds() {
    let product = Product::from_data_row(&row(json!(["Gold", "Equipment", null, 2_147_483_647]))).unwrap();
    assert_eq!(product.price(), 2_147_483_647.0);

    let product = Product::from_data_row(&row(json!(["Refund", "Food", null, -2_147_483_648i64]))).unwrap();
    assert_eq!(product.price(), -2_147_483_648.0);
  }

  #[test]
  fn test_from_data_row_rejects_bad_shapes() {
    let cases = [
      (json!(["Apple", "Food", null]), "arity"),
      (json!(["Apple", "Food", null, 2, 3]), "arity"),
      (json!([1, "Food", null, 2]), "name"),
      (json!(["Apple", "Drink", null, 2]), "type"),
      (json!(["Apple", "Food", 20240301, 2]), "expiry date"),
      (json!(["Apple", "Food", null, 2.5]), "price"),
      (json!(["Apple", "Food", null, "2"]), "price"),
      (json!(["Apple", "Food", null, 9_007_199_254_740_993i64]), "price"),
      (json!(["Apple", "Food", null, 2_147_483_648i64]), "price"),
    ];

    for (value, what) in cases {
      let err = Product::from_data_row(&row(value)).unwrap_err();
      match err {
        ClassifyError::RowArity { .. } => assert_eq!(what, "arity"),
        ClassifyError::RowField { field, .. } => assert_eq!(field, what),
        other => panic!("unexpected error {other:?}"),
      }
    }
  }

  #[test]
  fn test_from_data_rows_reports_failing_row() {
    let rows = vec![
      row(json!(["Apple", "Food", null, 2])),
      row(json!(["Hammer", "Tool", null, 15])),
    ];

    assert_eq!(
      from_data_rows(&rows).unwrap_err(),
      ClassifyError::RowField {
        row: 1,
        field: "type",
        expected: "must be either \"Equipment\" or \"Food\"",
      }
    );
  }
}
