//! Tasks screen: list on the left, filters and editor on the right.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Clear, List, ListItem, ListState, Paragraph},
};
use taskdesk_client::{
  ApiClient,
  combobox::{ComboState, Listing},
  views::TasksView,
};
use taskdesk_core::{
  FilterSet,
  task::{TaskFilterField, TaskStatus},
};

use super::{highlight, paged_pane, pane};
use crate::app::{App, FILTER_FIELDS, FormField, TaskFocus, filter_label};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(view) = app.tasks.as_ref() else { return };

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
    .split(area);
  let right = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(5), Constraint::Min(0)])
    .split(cols[1]);

  draw_list(f, cols[0], app, view);
  draw_filters(f, right[0], app, view);
  if view.capabilities().edit_tasks {
    draw_form(f, right[1], app, view);
  } else {
    draw_member_help(f, right[1]);
  }
}

fn status_style(status: TaskStatus) -> Style {
  match status {
    TaskStatus::Todo => Style::default().fg(Color::Gray),
    TaskStatus::InProgress => Style::default().fg(Color::Yellow),
    TaskStatus::Done => Style::default().fg(Color::Green),
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

fn draw_list(f: &mut Frame, area: Rect, app: &App, view: &TasksView<ApiClient>) {
  let list = view.list();
  let block = paged_pane(view.title(), list.pager(), app.task_focus == TaskFocus::List);
  let inner = block.inner(area);
  f.render_widget(block, area);

  if list.items().is_empty() {
    let text = if list.is_loading() { "Loading…" } else { view.empty_text() };
    f.render_widget(
      Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
      inner,
    );
    return;
  }

  let show_assignee = view.capabilities().view_all_tasks;
  let items: Vec<ListItem> = list
    .items()
    .iter()
    .map(|task| {
      let mut spans = vec![
        Span::styled(format!("{:<12}", task.status.as_str()), status_style(task.status)),
        Span::raw(task.title.clone()),
      ];
      if let Some(deadline) = task.deadline {
        spans.push(Span::styled(format!("  due {deadline}"), Style::default().fg(Color::DarkGray)));
      }
      if show_assignee {
        let who = task.assignee_email.as_deref().unwrap_or("unassigned");
        spans.push(Span::styled(format!("  @{who}"), Style::default().fg(Color::Cyan)));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.task_cursor));
  f.render_stateful_widget(
    List::new(items).highlight_style(highlight()),
    inner,
    &mut state,
  );
}

// ─── Filters ──────────────────────────────────────────────────────────────────

fn draw_filters(f: &mut Frame, area: Rect, app: &App, view: &TasksView<ApiClient>) {
  let focused = app.task_focus == TaskFocus::Filters;
  let block = pane("Filters", focused);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let filter = view.list().filter();
  let lines: Vec<Line> = FILTER_FIELDS
    .iter()
    .map(|&field| {
      let active = focused && app.filter_field == field;
      let value = if active && field != TaskFilterField::Status {
        format!("{}_", app.filter_draft)
      } else {
        let v = filter.get(field);
        if v.is_empty() { "any".to_owned() } else { v.to_owned() }
      };
      let label_style = if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::Gray)
      };
      Line::from(vec![
        Span::styled(format!("{:<14}", filter_label(field)), label_style),
        Span::raw(value),
      ])
    })
    .collect();
  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Editor ───────────────────────────────────────────────────────────────────

fn draw_form(f: &mut Frame, area: Rect, app: &App, view: &TasksView<ApiClient>) {
  let focused = app.task_focus == TaskFocus::Form;
  let form = view.form();
  let title = match form.editing {
    Some(id) => format!("Edit task #{id}"),
    None => "New task".to_owned(),
  };
  let block = pane(&title, focused);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines: Vec<Line> = FormField::ALL
    .iter()
    .map(|&field| {
      let active = focused && app.form_field == field;
      let value = match field {
        FormField::Title => form.title.clone(),
        FormField::Description => form.description.clone(),
        FormField::Status => format!("‹ {} ›", form.status),
        FormField::Deadline => form.deadline.clone(),
        FormField::Assignee => form.assignee.display_or("Unassigned").to_owned(),
      };
      let label_style = if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::Gray)
      };
      let cursor = if active && !matches!(field, FormField::Status | FormField::Assignee) { "_" } else { "" };
      Line::from(vec![
        Span::styled(format!("{:<12}", field.label()), label_style),
        Span::raw(value),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
      ])
    })
    .collect();
  f.render_widget(Paragraph::new(lines), inner);

  if view.assignee().is_open() {
    let popup = Rect {
      x:      inner.x + 12,
      y:      inner.y + FormField::ALL.len() as u16,
      width:  inner.width.saturating_sub(12),
      height: inner.height.saturating_sub(FormField::ALL.len() as u16),
    };
    draw_assignee_picker(f, popup, view);
  }
}

fn draw_assignee_picker(f: &mut Frame, area: Rect, view: &TasksView<ApiClient>) {
  if area.height < 3 {
    return;
  }
  let combo = view.assignee();
  f.render_widget(Clear, area);
  let block = pane(&format!("Assignee: {}_", combo.query()), true);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let hint = |text: &'static str| Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)));
  match combo.state() {
    ComboState::Open(Listing::Empty) => f.render_widget(hint("Type at least 2 characters"), inner),
    ComboState::Open(Listing::Querying) => f.render_widget(hint("Searching…"), inner),
    ComboState::Open(Listing::NoResults) => f.render_widget(hint("No matches"), inner),
    ComboState::Open(Listing::Results) => {
      let items: Vec<ListItem> =
        combo.results().iter().map(|u| ListItem::new(u.email.clone())).collect();
      let mut state = ListState::default();
      state.select(combo.active());
      f.render_stateful_widget(List::new(items).highlight_style(highlight()), inner, &mut state);
    }
    ComboState::Closed => {}
  }
}

fn draw_member_help(f: &mut Frame, area: Rect) {
  let block = pane("Status", false);
  let inner = block.inner(area);
  f.render_widget(block, area);
  let lines: Vec<Line> = TaskStatus::ALL
    .iter()
    .enumerate()
    .map(|(i, s)| {
      Line::from(vec![
        Span::styled(format!("{}  ", i + 1), Style::default().fg(Color::Cyan)),
        Span::styled(s.as_str(), status_style(*s)),
      ])
    })
    .collect();
  f.render_widget(Paragraph::new(lines), inner);
}
