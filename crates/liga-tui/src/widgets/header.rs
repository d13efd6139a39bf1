// Header bar: app title, greeting, admin badge and the session action.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use liga_core::model::SessionState;
use liga_core::t;

use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", t("app.title", &[])),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(greeting(&state.session), Style::default().fg(Color::White)),
    ];
    if state.session.is_admin {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("[{}]", t("home.admin", &[])),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    let left = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(left, area);

    if let Some(action) = session_action(&state.session) {
        let right = Paragraph::new(Line::from(Span::styled(
            format!("{action} "),
            Style::default().fg(Color::Gray),
        )))
        .alignment(Alignment::Right);
        frame.render_widget(right, area);
    }
}

/// "Hallo du" for visitors, "Hallo, <email>" once signed in.
pub fn greeting(session: &SessionState) -> String {
    if session.loading {
        return t("common.loading", &[]);
    }
    match session.email() {
        Some(email) => t("home.greetingUser", &[("email", email)]),
        None if session.user.is_some() => t("home.greetingUser", &[("email", "")]),
        None => t("home.greeting", &[]),
    }
}

/// Label of the log-in / log-out control, hidden while loading.
fn session_action(session: &SessionState) -> Option<String> {
    if session.loading {
        None
    } else if session.user.is_some() {
        Some(t("auth.logout", &[]))
    } else {
        Some(t("auth.login", &[]))
    }
}
