use ratatui::prelude::Color;
use ratatui::text::Span;

use crate::products::ProductKind;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Icon shown in front of a product
pub fn kind_icon(kind: ProductKind) -> &'static str {
  match kind {
    ProductKind::Equipment => "⚙",
    ProductKind::Food => "🍎",
  }
}

/// Cells reserved for the icon column, including the trailing gap
const ICON_COLUMN_WIDTH: usize = 3;

/// Icon padded by display width so rows line up whatever the glyph width
pub fn icon_cell(kind: ProductKind) -> String {
  let icon = kind_icon(kind);
  let width = Span::raw(icon).width();
  format!("{}{}", icon, " ".repeat(ICON_COLUMN_WIDTH.saturating_sub(width)))
}

/// Accent colour for a product row
pub fn kind_color(kind: ProductKind) -> Color {
  match kind {
    ProductKind::Equipment => Color::Cyan,
    ProductKind::Food => Color::Green,
  }
}

pub fn format_price(price: f64) -> String {
  format!("${:.2}", price)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("crème brûlée", 8), "crème...");
  }

  #[test]
  fn test_icon_cells_share_display_width() {
    let equipment = Span::raw(icon_cell(ProductKind::Equipment)).width();
    let food = Span::raw(icon_cell(ProductKind::Food)).width();
    assert_eq!(equipment, ICON_COLUMN_WIDTH);
    assert_eq!(food, ICON_COLUMN_WIDTH);
  }

  #[test]
  fn test_kind_color() {
    assert_eq!(kind_color(ProductKind::Equipment), Color::Cyan);
    assert_eq!(kind_color(ProductKind::Food), Color::Green);
  }

  #[test]
  fn test_format_price() {
    assert_eq!(format_price(120.0), "$120.00");
    assert_eq!(format_price(4.5), "$4.50");
  }
}
