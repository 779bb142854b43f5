//! Contact list pane: one card per contact, with a search bar.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use vouch_core::contact::{Contact, ContactKind};

use crate::app::App;

/// Render the list for `kind` into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App, kind: ContactKind) {
  let list = app.list(kind);
  let visible = list.visible();
  let total = list.contacts().len();

  // Title with count.
  let title = if list.search().is_empty() {
    format!(" {} ({}) ", kind.plural(), total)
  } else {
    format!(" {} ({}/{}) ", kind.plural(), visible.len(), total)
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Search bar on the top line of the pane.
  if inner_area.height > 2 {
    let search_area = Rect { height: 1, ..inner_area };
    inner_area.y += 2;
    inner_area.height -= 2;

    let text = match (app.search_active, list.search().is_empty()) {
      (true, _) => format!("Search: {}_", list.search()),
      (false, true) => "Search by name, email or relationship (/)".to_owned(),
      (false, false) => format!("Search: {}", list.search()),
    };
    let style = if app.search_active || !list.search().is_empty() {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    f.render_widget(Paragraph::new(text).style(style), search_area);
  }

  if let Some(empty) = list.empty_state() {
    let (headline, hint) = empty.message(kind);
    let lines = vec![
      Line::from(Span::styled(headline, Style::default().add_modifier(Modifier::BOLD))),
      Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Paragraph::new(lines), inner_area);
    return;
  }

  let items: Vec<ListItem> = visible.iter().map(|c| card(c, kind)).collect();

  // Scrollable list with cursor tracking.
  let mut state = ListState::default();
  state.select(Some(list.cursor()));

  f.render_stateful_widget(
    List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("▌"),
    inner_area,
    &mut state,
  );
}

fn card(contact: &Contact, kind: ContactKind) -> ListItem<'static> {
  let dim = Style::default().fg(Color::DarkGray);
  let badge = |present: bool, text: &'static str| {
    Span::styled(
      if present { text } else { "" },
      Style::default().fg(Color::Green),
    )
  };

  let mut lines = vec![
    Line::from(vec![
      Span::styled(
        contact.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
      ),
      Span::styled(format!("  {}", contact.relationship), dim),
      badge(contact.has_photo(), "  [photo]"),
      badge(contact.has_government_id(), "  [id]"),
    ]),
    Line::from(vec![
      Span::raw(format!("  {}", contact.email)),
      Span::styled(format!("  {}", contact.phone), dim),
    ]),
  ];

  if kind == ContactKind::Trustee {
    let approval = contact
      .approval_type
      .map(|a| a.to_string())
      .unwrap_or_default();
    let categories = contact
      .categories
      .iter()
      .map(ToString::to_string)
      .collect::<Vec<_>>()
      .join(", ");
    lines.push(Line::from(vec![
      Span::styled(format!("  {approval}"), Style::default().fg(Color::Cyan)),
      Span::styled(format!("  {categories}"), dim),
    ]));
  }

  lines.push(Line::from(""));
  ListItem::new(lines)
}
