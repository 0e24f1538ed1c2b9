use crate::loader::DisplayState;
use crate::products::Product;
use crate::ui::renderfns::{format_price, icon_cell, kind_color, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw_product_list(
  frame: &mut Frame,
  area: Rect,
  state: Option<&DisplayState>,
  selected: usize,
  loading: bool,
) {
  let title = match (state, loading) {
    (_, true) => " Products (loading...) ".to_string(),
    (Some(DisplayState::ProductList(products)), false) => format!(" Products ({}) ", products.len()),
    _ => " Products ".to_string(),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let products = match state {
    Some(DisplayState::ProductList(products)) => products,
    other => {
      let (content, color) = message_for(other, loading);
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    }
  };

  let items: Vec<ListItem> = products.iter().map(product_item).collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut list_state = ListState::default();
  list_state.select(Some(selected));

  frame.render_stateful_widget(list, area, &mut list_state);
}

fn message_for(state: Option<&DisplayState>, loading: bool) -> (&'static str, Color) {
  match state {
    Some(DisplayState::ServerError) => ("The product server returned an error.", Color::Red),
    Some(DisplayState::ServerNoProducts) => ("The server has no products.", Color::DarkGray),
    Some(DisplayState::OfflineNoProducts) => (
      "You are offline and no products have been cached yet.",
      Color::Yellow,
    ),
    Some(DisplayState::ProductList(_)) | None if loading => ("Loading...", Color::DarkGray),
    Some(DisplayState::ProductList(_)) | None => ("Press r to load products.", Color::DarkGray),
  }
}

fn product_item(product: &Product) -> ListItem<'static> {
  let kind = product.kind();
  let color = kind_color(kind);

  let mut spans = vec![
    Span::styled(icon_cell(kind), Style::default().fg(color)),
    Span::styled(
      format!("{:<10}", kind.as_str()),
      Style::default().fg(color),
    ),
    Span::raw(" "),
    Span::styled(
      format!("{:<30}", truncate(product.name(), 30)),
      Style::default().add_modifier(Modifier::BOLD),
    ),
    Span::raw(" "),
    Span::styled(
      format!("{:>10}", format_price(product.price())),
      Style::default().fg(Color::White),
    ),
  ];

  if let Some(expiry) = product.expiry_date() {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("expires {}", expiry),
      Style::default().fg(Color::DarkGray),
    ));
  }

  ListItem::new(Line::from(spans))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::products::ProductDetails;
  use ratatui::backend::TestBackend;

  fn render(state: Option<&DisplayState>, loading: bool) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 6)).unwrap();
    terminal
      .draw(|frame| draw_product_list(frame, frame.area(), state, 0, loading))
      .unwrap();

    let buffer = terminal.backend().buffer();
    buffer
      .content()
      .chunks(buffer.area.width as usize)
      .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  #[test]
  fn test_renders_products() {
    let state = DisplayState::ProductList(vec![
      Product::Equipment(ProductDetails {
        name: "Tent".to_string(),
        expiry_date: None,
        price: 120.0,
      }),
      Product::Food(ProductDetails {
        name: "Jerky".to_string(),
        expiry_date: Some("2025-01-01".to_string()),
        price: 4.5,
      }),
    ]);

    let screen = render(Some(&state), false);
    assert!(screen.contains("Products (2)"));
    assert!(screen.contains("Tent"));
    assert!(screen.contains("$120.00"));
    assert!(screen.contains("expires 2025-01-01"));
  }

  /// Cell column at which `needle` starts on the first row containing it.
  fn column_of(state: &DisplayState, needle: &str) -> usize {
    let mut terminal = Terminal::new(TestBackend::new(100, 6)).unwrap();
    terminal
      .draw(|frame| draw_product_list(frame, frame.area(), Some(state), 0, false))
      .unwrap();

    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
      .content()
      .chunks(width)
      .find_map(|row| {
        (0..width).find(|&x| {
          row[x..]
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
            .starts_with(needle)
        })
      })
      .unwrap()
  }

  #[test]
  fn test_columns_line_up_across_kinds() {
    let state = DisplayState::ProductList(vec![
      Product::Equipment(ProductDetails {
        name: "Tent".to_string(),
        expiry_date: None,
        price: 120.0,
      }),
      Product::Food(ProductDetails {
        name: "Jerky".to_string(),
        expiry_date: None,
        price: 4.5,
      }),
    ]);

    assert_eq!(column_of(&state, "Tent"), column_of(&state, "Jerky"));
    assert_eq!(
      column_of(&state, "$120.00") + "$120.00".len(),
      column_of(&state, "$4.50") + "$4.50".len()
    );
  }

  #[test]
  fn test_renders_messages() {
    assert!(render(Some(&DisplayState::ServerError), false).contains("returned an error"));
    assert!(render(Some(&DisplayState::ServerNoProducts), false).contains("no products"));
    assert!(render(Some(&DisplayState::OfflineNoProducts), false).contains("offline"));
    assert!(render(None, true).contains("loading..."));
  }
}
