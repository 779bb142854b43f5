//! TUI rendering.

pub mod contact_form;
pub mod contact_list;
pub mod dashboard;
pub mod dialog;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.tab {
    Tab::Dashboard => dashboard::draw(f, rows[1], app),
    Tab::Contacts(kind) => {
      contact_list::draw(f, rows[1], app, kind);

      // Overlays, bottom to top.
      let list = app.list(kind);
      if let Some(form) = list.form() {
        contact_form::draw(f, rows[1], app, form);
      }
      if let Some(confirm) = list.pending_delete() {
        dialog::draw_confirm(f, rows[1], &confirm.message);
      }
      if let Some(notice) = list.notice() {
        dialog::draw_notice(f, rows[1], &notice.message);
      }
    }
  }
  draw_status(f, rows[2], app);
}

/// A rectangle of `width` × `height` centred in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let mut spans = vec![Span::styled(
    " vouch ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )];
  for (i, tab) in Tab::ALL.iter().enumerate() {
    let style = if *tab == app.tab {
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::raw(" "));
    spans.push(Span::styled(format!(" {} {} ", i + 1, tab.title()), style));
  }

  let right = Span::styled(
    format!("{} · {date} ", app.backend_name()),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let right_width = right.content.chars().count();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right_width);
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.tab {
    Tab::Dashboard => ("HOME", "1-3/Tab switch  r refresh  q quit"),
    Tab::Contacts(kind) => {
      let list = app.list(kind);
      if list.notice().is_some() {
        ("NOTICE", "Enter/Esc close")
      } else if list.pending_delete().is_some() {
        ("CONFIRM", "y/Enter delete  n/Esc cancel")
      } else if list.form().is_some_and(|f| f.is_editable()) {
        (
          "FORM",
          "Tab/↑↓ field  ←→ choose  Space toggle  Enter upload  Ctrl-S save  Esc close",
        )
      } else if list.form().is_some() {
        ("VIEW", "↑↓ field  Esc close")
      } else if app.search_active {
        ("SEARCH", "Type to filter  Esc clear  Enter done")
      } else {
        (
          "NORMAL",
          "↑↓/jk move  / search  a add  e edit  v view  d delete  x export  r refresh  q quit",
        )
      }
    }
  };

  // Errors from the last fetch or delete take precedence over hints.
  let last_error = match app.tab {
    Tab::Contacts(kind) => app.list(kind).last_error(),
    Tab::Dashboard => None,
  };
  let (status, status_style) = match last_error {
    Some(err) => (format!("Error: {err}"), Style::default().fg(Color::Red)),
    None if !app.status_msg.is_empty() => {
      (app.status_msg.clone(), Style::default().fg(Color::Yellow))
    }
    None => (hints.to_string(), Style::default().fg(Color::DarkGray)),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), status_style);

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
