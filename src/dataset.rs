use serde_json::{json, Value};

/// Built-in import rows shown before the first network load completes.
///
/// Each row is `[name, type, expiry date or null, price]`.
pub fn demo_rows() -> Vec<Vec<Value>> {
  [
    json!(["Treadmill", "Equipment", null, 32]),
    json!(["Banana", "Food", "2024-02-29", 29]),
    json!(["Dumbbell", "Equipment", null, 21]),
    json!(["Apple", "Food", "2024-03-01", 2]),
    json!(["Yoga Mat", "Equipment", null, 25]),
    json!(["Protein Bar", "Food", "2024-05-15", 3]),
    json!(["Headlamp", "Equipment", "2027-12-31", 18]),
    json!(["Trail Mix", "Food", "2024-08-01", 6]),
  ]
  .into_iter()
  .filter_map(|row| row.as_array().cloned())
  .collect()
}
