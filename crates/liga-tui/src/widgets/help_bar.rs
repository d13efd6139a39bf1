// Status line and key hints at the bottom of the screen.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use liga_core::protocol::Route;
use liga_core::t;

use crate::{DetailView, ViewState};

/// Render the last error, or a loading notice while a league is fetched.
pub fn render_status(frame: &mut Frame, area: Rect, state: &ViewState) {
    let span = if let Some(message) = &state.status {
        Span::styled(format!(" {message}"), Style::default().fg(Color::Red))
    } else if matches!(state.detail, DetailView::Loading(_)) || state.session.loading {
        Span::styled(
            format!(" {}", t("common.loading", &[])),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw("")
    };
    frame.render_widget(Paragraph::new(Line::from(span)), area);
}

/// Render the key hints for whatever currently has focus.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = hints(state).join(" · ");
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!(" {text}"),
        Style::default().fg(Color::Gray),
    )))
    .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Hint groups for the current context; admin-only actions are listed only
/// for admins.
pub fn hints(state: &ViewState) -> Vec<String> {
    if state.dialog.is_some() {
        return vec![t("help.dialog", &[])];
    }
    match &state.route {
        Route::Login => vec![t("help.login", &[])],
        Route::Home => {
            let mut hints = vec![t("help.home", &[])];
            if state.session.is_admin {
                hints.push(t("help.newLeague", &[]));
            }
            if state.session.user.is_some() {
                hints.push(t("help.signOut", &[]));
            } else {
                hints.push(t("help.signIn", &[]));
            }
            hints.push(t("help.quit", &[]));
            hints
        }
        Route::League(_) => {
            if state.drag.is_dragging() {
                return vec![t("help.dragging", &[])];
            }
            let mut hints = vec![t("help.league", &[])];
            if state.session.is_admin && state.loaded().is_some() {
                hints.push(t("help.edit", &[]));
            }
            hints
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{league_view, session};
    use crate::DialogState;
    use liga_core::model::Country;

    #[test]
    fn home_hints_follow_session() {
        let mut state = ViewState::default();
        state.session = session(None);
        let signed_in = hints(&state);
        assert!(signed_in.contains(&"o Abmelden".to_string()));
        assert!(!signed_in.contains(&"n Neue Liga".to_string()));

        state.session = session(Some("admin"));
        assert!(hints(&state).contains(&"n Neue Liga".to_string()));

        state.session.user = None;
        state.session.is_admin = false;
        assert!(hints(&state).contains(&"l Anmelden".to_string()));
    }

    #[test]
    fn dragging_replaces_league_hints() {
        let mut state = league_view(&["a", "b"]);
        assert!(hints(&state)[0].contains("Aufnehmen"));
        state.drag.pick_up(0);
        assert_eq!(hints(&state), vec![t("help.dragging", &[])]);
    }

    #[test]
    fn open_dialog_takes_over() {
        let mut state = ViewState::default();
        state.dialog = Some(DialogState::create(Country::De));
        assert_eq!(hints(&state), vec![t("help.dialog", &[])]);
    }
}
