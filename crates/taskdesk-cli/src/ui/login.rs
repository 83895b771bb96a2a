//! Sign-in / registration pane.

use ratatui::{
  Frame,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::Paragraph,
};
use taskdesk_client::views::LoginMode;

use super::pane;
use crate::app::{App, LoginField};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let [column] = Layout::horizontal([Constraint::Length(52)])
    .flex(Flex::Center)
    .areas(area);
  let [form] = Layout::vertical([Constraint::Length(6)])
    .flex(Flex::Center)
    .areas(column);

  let title = match app.login.mode() {
    LoginMode::Login => "Sign in",
    LoginMode::Register => "Register",
  };
  let block = pane(title, true);
  let inner = block.inner(form);
  f.render_widget(block, form);

  let masked = "•".repeat(app.login.password.chars().count());
  let lines = vec![
    field_line("Email   ", &app.login.email, app.login_field == LoginField::Email),
    field_line("Password", &masked, app.login_field == LoginField::Password),
    Line::default(),
    Line::from(Span::styled(
      if app.login.is_busy() { "Signing in…" } else { "Enter to submit" },
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
  let label_style = if focused {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  };
  let cursor = if focused { "_" } else { "" };
  Line::from(vec![
    Span::styled(format!("{label}  "), label_style),
    Span::raw(value),
    Span::styled(cursor, Style::default().fg(Color::Cyan)),
  ])
}
