// Login screen: email and password fields with sign-in / sign-up actions.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use liga_core::t;

use crate::layout::centered_rect;
use crate::{LoginField, ViewState};

const FORM_WIDTH: u16 = 50;
const FORM_HEIGHT: u16 = 12;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let form_area = centered_rect(FORM_WIDTH, FORM_HEIGHT, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", t("auth.login", &[])));
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let rows = Layout::vertical([
        Constraint::Length(3), // email
        Constraint::Length(3), // password
        Constraint::Length(1), // actions
        Constraint::Min(1),    // error / notice
    ])
    .split(inner);

    let form = &state.login;
    frame.render_widget(
        field(
            &t("auth.email", &[]),
            form.email.clone(),
            state.login_focus == LoginField::Email,
        ),
        rows[0],
    );
    frame.render_widget(
        field(
            &t("auth.password", &[]),
            mask(&form.password),
            state.login_focus == LoginField::Password,
        ),
        rows[1],
    );

    let actions = if form.loading {
        Line::from(Span::styled(
            t("common.loading", &[]),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let style = if form.can_submit() {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::from(vec![
            Span::styled(format!("[{}] Enter", t("auth.login", &[])), style),
            Span::raw("   "),
            Span::styled(format!("[{}] Strg+R", t("auth.signup", &[])), style),
        ])
    };
    frame.render_widget(Paragraph::new(actions), rows[2]);

    let notice = if let Some(error) = &form.error {
        Some(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else {
        form.message
            .as_ref()
            .map(|m| Span::styled(m.clone(), Style::default().fg(Color::Green)))
    };
    if let Some(notice) = notice {
        frame.render_widget(
            Paragraph::new(Line::from(notice)).wrap(Wrap { trim: true }),
            rows[3],
        );
    }
}

fn field(label: &str, value: String, focused: bool) -> Paragraph<'static> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if focused { "▏" } else { "" };
    Paragraph::new(format!("{value}{cursor}")).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {label} ")),
    )
}

/// One bullet per character.
fn mask(password: &str) -> String {
    "•".repeat(password.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply_ui_update;
    use crate::tests::render_text;
    use liga_core::protocol::{Route, UiUpdate};

    fn login_view() -> ViewState {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Navigate(Route::Login));
        state
    }

    #[test]
    fn password_is_masked() {
        let mut state = login_view();
        state.login.email = "anna@example.com".into();
        state.login.password = "geheim".into();
        let text = render_text(&state, 80, 24);
        assert!(text.contains("anna@example.com"));
        assert!(!text.contains("geheim"));
        assert!(text.contains("••••••"));
    }

    #[test]
    fn backend_error_is_shown_verbatim() {
        let mut state = login_view();
        apply_ui_update(
            &mut state,
            UiUpdate::LoginFailed("Invalid login credentials".into()),
        );
        assert!(render_text(&state, 80, 24).contains("Invalid login credentials"));
    }

    #[test]
    fn loading_replaces_actions() {
        let mut state = login_view();
        assert!(render_text(&state, 80, 24).contains("[Registrieren]"));
        state.login.loading = true;
        assert!(!render_text(&state, 80, 24).contains("[Registrieren]"));
    }
}
