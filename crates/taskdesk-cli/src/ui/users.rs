//! Users screen (admin only).

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};
use taskdesk_core::Role;

use super::{highlight, paged_pane, pane};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(view) = app.users.as_ref() else { return };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(0)])
    .split(area);

  // Search box.
  let block = pane("Search users", app.user_searching);
  let inner = block.inner(rows[0]);
  f.render_widget(block, rows[0]);
  let cursor = if app.user_searching { "_" } else { "" };
  f.render_widget(Paragraph::new(format!("/{}{cursor}", view.draft())), inner);

  // List.
  let list = view.list();
  let block = paged_pane("Users", list.pager(), !app.user_searching);
  let inner = block.inner(rows[1]);
  f.render_widget(block, rows[1]);

  if list.items().is_empty() {
    let text = if list.is_loading() { "Loading…" } else { "No users found." };
    f.render_widget(
      Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = list
    .items()
    .iter()
    .map(|account| {
      let role_style = match account.role() {
        Some(Role::Admin) => Style::default().fg(Color::Magenta),
        Some(Role::User) => Style::default().fg(Color::Gray),
        None => Style::default().fg(Color::Red),
      };
      let joined = account
        .created_at
        .map(|t| format!("  joined {}", t.format("%Y-%m-%d")))
        .unwrap_or_default();
      ListItem::new(Line::from(vec![
        Span::styled(format!("{:<7}", account.role), role_style),
        Span::raw(account.email.clone()),
        Span::styled(joined, Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.user_cursor));
  f.render_stateful_widget(List::new(items).highlight_style(highlight()), inner, &mut state);
}
