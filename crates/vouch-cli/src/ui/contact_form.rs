//! Add / edit / view overlay for a single contact.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use vouch_core::{
  asset::AssetSlot,
  form::FormController,
  schema::{Field, FieldSpec},
};

use super::centered;
use crate::app::{App, FormRow, form_rows};

const LABEL_WIDTH: usize = 16;

pub fn draw(f: &mut Frame, area: Rect, app: &App, form: &FormController) {
  let schema = form.schema();
  let rows = form_rows(schema);
  let focus = app.form_ui.row.min(rows.len().saturating_sub(1));
  let editable = form.is_editable();

  let mut lines: Vec<Line> = Vec::new();
  for (i, row) in rows.iter().enumerate() {
    let focused = editable && i == focus;
    match *row {
      FormRow::Field(field) => {
        if let Some(spec) = schema.spec(field) {
          lines.push(field_line(app, form, spec, focused));
        }
      }
      FormRow::Slot(slot) => lines.extend(slot_lines(app, form, slot, focused)),
    }
  }

  lines.push(Line::from(""));
  if let Some(err) = form.error() {
    lines.push(Line::from(Span::styled(
      err.to_owned(),
      Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )));
  }
  if editable {
    let submit_style = if form.can_submit() {
      Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let mut footer = vec![Span::styled(
      format!("[Ctrl-S] {}", form.submit_label()),
      submit_style,
    )];
    if form.is_uploading() {
      footer.push(Span::styled(
        "  waiting for uploads",
        Style::default().fg(Color::Yellow),
      ));
    }
    lines.push(Line::from(footer));
  } else {
    lines.push(Line::from(Span::styled(
      "[Esc] Close",
      Style::default().fg(Color::Gray),
    )));
  }

  let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
  let rect = centered(area, 72, height);
  let block = Block::default()
    .title(format!(" {} ", form.title()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  f.render_widget(Clear, rect);
  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    rect,
  );
}

fn label_span(label: &str, required: bool, focused: bool) -> Span<'static> {
  let text = if required { format!("{label}*") } else { label.to_owned() };
  let style = if focused {
    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Cyan)
  };
  Span::styled(format!("{text:<LABEL_WIDTH$}"), style)
}

fn field_line(
  app: &App,
  form: &FormController,
  spec: &FieldSpec,
  focused: bool,
) -> Line<'static> {
  let mut spans = vec![label_span(spec.label, spec.required, focused)];
  let draft = form.draft();

  if spec.field == Field::Categories {
    for (i, option) in spec.options.iter().enumerate() {
      let checked = draft
        .categories
        .iter()
        .any(|c| AsRef::<str>::as_ref(c) == *option);
      let mark = if checked { "[x]" } else { "[ ]" };
      let mut style = Style::default();
      if focused && i == app.form_ui.option_cursor {
        style = style.add_modifier(Modifier::REVERSED);
      }
      spans.push(Span::styled(format!("{mark} {option} "), style));
    }
    return Line::from(spans);
  }

  let value = draft.value(spec.field);
  if spec.is_enumerated() {
    let shown = if value.is_empty() { "(none)".to_owned() } else { value };
    if focused && form.is_editable() {
      spans.push(Span::raw(format!("< {shown} >")));
    } else {
      spans.push(Span::raw(shown));
    }
  } else {
    spans.push(Span::raw(value));
    if focused {
      spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
  }
  Line::from(spans)
}

fn slot_lines(
  app: &App,
  form: &FormController,
  slot: AssetSlot,
  focused: bool,
) -> Vec<Line<'static>> {
  let dim = Style::default().fg(Color::DarkGray);
  let draft = form.draft();
  let stored: &str = match slot {
    AssetSlot::Photo => form.photo_preview().unwrap_or(&draft.photo_url),
    AssetSlot::GovernmentId => &draft.government_id_url,
  };

  let mut first = vec![label_span(&slot.to_string(), false, focused)];
  if form.is_editable() {
    let path = app.form_ui.path(slot);
    if path.is_empty() && !focused {
      first.push(Span::styled(format!("({})", slot.accepted()), dim));
    } else {
      first.push(Span::raw(path.to_owned()));
      if focused {
        first.push(Span::styled("_", Style::default().fg(Color::Yellow)));
      }
    }
  }

  let pad = " ".repeat(LABEL_WIDTH);
  let status = if form.is_slot_uploading(slot) {
    Span::styled(format!("{pad}Uploading..."), Style::default().fg(Color::Yellow))
  } else if let Some(err) = form.slot_error(slot) {
    Span::styled(format!("{pad}{err}"), Style::default().fg(Color::Red))
  } else if stored.is_empty() {
    Span::styled(format!("{pad}No file"), dim)
  } else {
    Span::styled(format!("{pad}{stored}"), Style::default().fg(Color::Green))
  };

  if form.is_editable() {
    vec![Line::from(first), Line::from(status)]
  } else {
    // View mode has nothing to type; fold the status onto the label line.
    first.push(Span::styled(
      status.content.trim_start().to_owned(),
      status.style,
    ));
    vec![Line::from(first)]
  }
}
