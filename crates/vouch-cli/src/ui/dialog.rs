//! Modal overlays: delete confirmation and notices.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::centered;

fn draw_box(f: &mut Frame, area: Rect, title: &str, color: Color, lines: Vec<Line<'_>>) {
  let rect = centered(area, 56, 7);
  let block = Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(color));
  f.render_widget(Clear, rect);
  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
    rect,
  );
}

pub fn draw_confirm(f: &mut Frame, area: Rect, message: &str) {
  draw_box(f, area, "Confirm Delete", Color::Red, vec![
    Line::from(message.to_owned()),
    Line::from(""),
    Line::from(vec![
      Span::styled("[y] Delete", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
      Span::raw("   "),
      Span::styled("[n] Cancel", Style::default().fg(Color::Gray)),
    ]),
  ]);
}

pub fn draw_notice(f: &mut Frame, area: Rect, message: &str) {
  draw_box(f, area, "Success", Color::Green, vec![
    Line::from(message.to_owned()),
    Line::from(""),
    Line::from(Span::styled("[Enter] OK", Style::default().fg(Color::Gray))),
  ]);
}
