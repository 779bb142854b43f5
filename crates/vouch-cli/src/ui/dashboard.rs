//! Dashboard tab with record counts per kind.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use vouch_core::contact::ContactKind;

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(area);

  for (kind, col) in ContactKind::ALL.into_iter().zip(cols.iter()) {
    draw_card(f, *col, app, kind);
  }
}

fn draw_card(f: &mut Frame, area: Rect, app: &App, kind: ContactKind) {
  let list = app.list(kind);
  let block = Block::default()
    .title(format!(" {} ", kind.plural()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let dim = Style::default().fg(Color::DarkGray);

  let lines = if list.is_loading() {
    vec![Line::from(Span::styled(format!("Loading {}...", kind.plural().to_lowercase()), dim))]
  } else {
    let contacts = list.contacts();
    let with_photo = contacts.iter().filter(|c| c.has_photo()).count();
    let with_id = contacts.iter().filter(|c| c.has_government_id()).count();
    let mut lines = vec![
      Line::from(vec![
        Span::styled(format!("{:<16}", "Total"), label),
        Span::raw(contacts.len().to_string()),
      ]),
      Line::from(vec![
        Span::styled(format!("{:<16}", "With photo"), label),
        Span::raw(with_photo.to_string()),
      ]),
      Line::from(vec![
        Span::styled(format!("{:<16}", "With ID"), label),
        Span::raw(with_id.to_string()),
      ]),
    ];
    if let Some(err) = list.last_error() {
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(err.to_owned(), Style::default().fg(Color::Red))));
    }
    lines
  };

  f.render_widget(Paragraph::new(lines), inner);
}
