//! TUI rendering — orchestrates all panes.

pub mod login;
pub mod tasks;
pub mod users;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use taskdesk_core::page::Pager;

use crate::app::{App, Screen, TaskFocus};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  match app.screen {
    Screen::Login => login::draw(f, rows[1], app),
    Screen::Tasks => tasks::draw(f, rows[1], app),
    Screen::Users => users::draw(f, rows[1], app),
    Screen::Denied => draw_denied(f, rows[1]),
  }
  draw_status(f, rows[2], app);
}

/// Shared bordered block; focused panes get a brighter border.
pub(crate) fn pane(title: &str, focused: bool) -> Block<'static> {
  let border = if focused { Color::Cyan } else { Color::DarkGray };
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border))
}

/// Title line for a paged list: `label  ◀ [  Page x / y  ] ▶`, with each
/// arrow dimmed when that move is unavailable.
pub(crate) fn pager_title(label: &str, pager: Pager) -> Line<'static> {
  let arrow = |text: &'static str, enabled: bool| {
    let style = if enabled {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    };
    Span::styled(text, style)
  };
  Line::from(vec![
    Span::raw(format!(" {label}  ")),
    arrow("◀ [", pager.can_prev()),
    Span::raw(format!("  {}  ", pager.label())),
    arrow("] ▶", pager.can_next()),
    Span::raw(" "),
  ])
}

/// A [`pane`] whose title carries the pager.
pub(crate) fn paged_pane(label: &str, pager: Pager, focused: bool) -> Block<'static> {
  let border = if focused { Color::Cyan } else { Color::DarkGray };
  Block::default()
    .title(pager_title(label, pager))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border))
}

pub(crate) fn highlight() -> Style {
  Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD)
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();
  let who = app
    .session
    .credential()
    .and_then(|c| c.email().map(str::to_owned))
    .unwrap_or_default();

  let left = Span::styled(
    " taskdesk",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{who}  {date} "), Style::default().fg(Color::Gray));

  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Access denied ────────────────────────────────────────────────────────────

fn draw_denied(f: &mut Frame, area: Rect) {
  let block = pane("Access denied", false);
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(vec![
      Line::from("Your account has no recognised role."),
      Line::from(Span::styled(
        "Press L to sign out.",
        Style::default().fg(Color::DarkGray),
      )),
    ]),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    Screen::Login => ("LOGIN", "Tab switch field  Enter sign in  Ctrl-R login/register  Ctrl-C quit"),
    Screen::Denied => ("DENIED", "L sign out  q quit"),
    Screen::Users if app.user_searching => ("SEARCH", "Type query  Enter search  Esc cancel"),
    Screen::Users => (
      "USERS",
      "↑↓ move  [ ] page  / search  r reset  g refresh  R toggle role  d delete  t tasks  L sign out",
    ),
    Screen::Tasks => match app.task_focus {
      TaskFocus::List if app.access.is_admin() => (
        "TASKS",
        "↑↓ move  [ ] page  / filter  g refresh  n new  e edit  a assign  d delete  1-3 status  u users  L sign out",
      ),
      TaskFocus::List => ("TASKS", "↑↓ move  [ ] page  / filter  g refresh  1-3 set status  L sign out"),
      TaskFocus::Filters => ("FILTER", "↑↓ field  ←→ status  Enter apply  Esc back"),
      TaskFocus::Form => ("EDIT", "↑↓ field  ←→ status  Enter save / pick  Esc cancel"),
    },
  };

  let (busy, loading, error) = match app.screen {
    Screen::Tasks => app.tasks.as_ref().map_or((false, false, None), |v| {
      (v.list().is_busy(), v.list().is_loading(), v.list().error())
    }),
    Screen::Users => app.users.as_ref().map_or((false, false, None), |v| {
      (v.list().is_busy(), v.list().is_loading(), v.list().error())
    }),
    Screen::Login => (app.login.is_busy(), false, app.login.error()),
    Screen::Denied => (false, false, None),
  };

  let (status, style) = if app.pending_delete.is_some() {
    (app.status_msg.clone(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
  } else if let Some(error) = error {
    (format!("Error: {error}"), Style::default().fg(Color::Red))
  } else if busy {
    ("Saving…".to_owned(), Style::default().fg(Color::Yellow))
  } else if loading {
    ("Loading…".to_owned(), Style::default().fg(Color::Yellow))
  } else if !app.status_msg.is_empty() {
    (app.status_msg.clone(), Style::default().fg(Color::Gray))
  } else {
    (hints.to_owned(), Style::default().fg(Color::DarkGray))
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let line = Line::from(vec![mode_span, Span::styled(format!("  {status}"), style)]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
