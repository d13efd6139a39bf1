// Keyboard and mouse input handling and command dispatch.
//
// Translates crossterm events into UserCommand messages sent to the app
// orchestrator, or into local ViewState mutations (selection, focus, form
// text, drag state).

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use liga_core::model::{Country, LeagueId};
use liga_core::protocol::{Route, UserCommand};

use crate::layout::{build_layout, league_layout};
use crate::{DialogField, DialogState, LoginField, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press must reach the app
/// orchestrator, `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports both Press and Release.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if ctrl(&key_event, 'c') {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if view_state.dialog.is_some() {
        return handle_dialog(key_event, view_state);
    }

    match view_state.route.clone() {
        Route::Home => handle_home(key_event, view_state),
        Route::Login => handle_login(key_event, view_state),
        Route::League(league_id) => handle_league(key_event, view_state, league_id),
    }
}

fn ctrl(key_event: &KeyEvent, c: char) -> bool {
    key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char(c)
}

/// `j`/`y`/`q` confirm, `n`/Esc cancel, everything else is blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('j' | 'J' | 'y' | 'Y' | 'q' | 'Q') => Some(UserCommand::Quit),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

fn handle_home(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Left => Some(UserCommand::SelectCountry(view_state.country.prev())),
        KeyCode::Right => Some(UserCommand::SelectCountry(view_state.country.next())),
        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            Country::ALL.get(index).copied().map(UserCommand::SelectCountry)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.league_selected = view_state.league_selected.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let len = view_state.visible_leagues().len();
            if view_state.league_selected + 1 < len {
                view_state.league_selected += 1;
            }
            None
        }
        KeyCode::Enter => view_state
            .selected_league()
            .map(|league| UserCommand::Navigate(Route::League(league.id))),
        KeyCode::Char('n') => {
            if view_state.session.is_admin {
                view_state.dialog = Some(DialogState::create(view_state.country));
            }
            None
        }
        KeyCode::Char('l') if view_state.session.user.is_none() => {
            Some(UserCommand::Navigate(Route::Login))
        }
        KeyCode::Char('o') if view_state.session.user.is_some() => Some(UserCommand::SignOut),
        KeyCode::Char('r') => Some(UserCommand::Refresh),
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

fn handle_login(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    if ctrl(&key_event, 'r') {
        return submit_login(view_state, true);
    }
    match key_event.code {
        KeyCode::Esc => Some(UserCommand::Navigate(Route::Home)),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            view_state.login_focus = match view_state.login_focus {
                LoginField::Email => LoginField::Password,
                LoginField::Password => LoginField::Email,
            };
            None
        }
        KeyCode::Enter => submit_login(view_state, false),
        KeyCode::Backspace => {
            login_field(view_state).pop();
            None
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            login_field(view_state).push(c);
            None
        }
        _ => None,
    }
}

fn login_field(view_state: &mut ViewState) -> &mut String {
    match view_state.login_focus {
        LoginField::Email => &mut view_state.login.email,
        LoginField::Password => &mut view_state.login.password,
    }
}

fn submit_login(view_state: &mut ViewState, sign_up: bool) -> Option<UserCommand> {
    if !view_state.login.can_submit() {
        return None;
    }
    view_state.login.begin();
    let email = view_state.login.email.trim().to_string();
    let password = view_state.login.password.clone();
    Some(if sign_up {
        UserCommand::SignUp { email, password }
    } else {
        UserCommand::SignIn { email, password }
    })
}

// ---------------------------------------------------------------------------
// League detail
// ---------------------------------------------------------------------------

fn handle_league(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    league_id: LeagueId,
) -> Option<UserCommand> {
    let len = view_state.teams().len();
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_ranking(view_state, -1, len);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_ranking(view_state, 1, len);
            None
        }
        KeyCode::Char(' ') => {
            if view_state.drag.is_dragging() {
                let drop = view_state.drag.release()?;
                view_state.ranking_selected = drop.to;
                Some(UserCommand::Reorder {
                    league_id,
                    from: drop.from,
                    to: drop.to,
                })
            } else {
                if len > 0 {
                    view_state.drag.pick_up(view_state.ranking_selected);
                }
                None
            }
        }
        KeyCode::Esc => {
            if view_state.drag.is_dragging() {
                view_state.drag.cancel();
                None
            } else {
                Some(UserCommand::Navigate(Route::Home))
            }
        }
        KeyCode::Char('e') => {
            if view_state.session.is_admin {
                if let Some(detail) = view_state.loaded() {
                    view_state.dialog = Some(DialogState::edit(detail));
                }
            }
            None
        }
        KeyCode::Char('r') if !view_state.drag.is_dragging() => Some(UserCommand::Refresh),
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

/// Move the selection, or the drop target while dragging, keeping it on
/// screen.
fn move_ranking(view_state: &mut ViewState, delta: isize, len: usize) {
    if len == 0 {
        return;
    }
    if view_state.drag.is_dragging() {
        view_state.drag.step(delta, len);
        if let Some(target) = view_state.drag.target() {
            view_state.ranking_selected = target;
        }
    } else {
        let next = (view_state.ranking_selected as isize + delta).clamp(0, len as isize - 1);
        view_state.ranking_selected = next as usize;
    }
    view_state.scroll_ranking_to_selection();
}

// ---------------------------------------------------------------------------
// Dialog
// ---------------------------------------------------------------------------

fn handle_dialog(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let Some(dialog) = view_state.dialog.as_mut() else {
        return None;
    };

    if ctrl(&key_event, 's') {
        return dialog.submit();
    }
    if dialog.form.saving {
        // Only Esc gets through while a save is in flight.
        if key_event.code == KeyCode::Esc {
            view_state.dialog = None;
        }
        return None;
    }

    match key_event.code {
        KeyCode::Esc => {
            view_state.dialog = None;
        }
        KeyCode::Tab => dialog.focus = dialog.focus.next(),
        KeyCode::BackTab => dialog.focus = dialog.focus.prev(),
        KeyCode::Enter => match dialog.focus {
            DialogField::Name => dialog.focus = DialogField::TeamInput,
            DialogField::TeamInput => {
                if dialog.form.add_team() {
                    dialog.selected_team = dialog.form.teams.len() - 1;
                }
            }
            DialogField::Teams => {}
        },
        KeyCode::Up if dialog.focus == DialogField::Teams => {
            dialog.selected_team = dialog.selected_team.saturating_sub(1);
        }
        KeyCode::Down if dialog.focus == DialogField::Teams => {
            if dialog.selected_team + 1 < dialog.form.teams.len() {
                dialog.selected_team += 1;
            }
        }
        KeyCode::Delete => remove_selected_team(dialog),
        KeyCode::Backspace => match dialog.focus {
            DialogField::Name => {
                dialog.form.name.pop();
            }
            DialogField::TeamInput => {
                dialog.form.team_input.pop();
            }
            DialogField::Teams => remove_selected_team(dialog),
        },
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            match dialog.focus {
                DialogField::Name => dialog.form.name.push(c),
                DialogField::TeamInput => dialog.form.team_input.push(c),
                DialogField::Teams => {}
            }
        }
        _ => {}
    }
    None
}

fn remove_selected_team(dialog: &mut DialogState) {
    if dialog.form.remove_team(dialog.selected_team).is_some() {
        let len = dialog.form.teams.len();
        dialog.selected_team = dialog.selected_team.min(len.saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Mouse
// ---------------------------------------------------------------------------

/// Handle a mouse event: press on a ranking row picks it up, dragging
/// updates the drop target, release reorders.
pub fn handle_mouse(mouse_event: MouseEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let Route::League(league_id) = view_state.route.clone() else {
        return None;
    };
    if view_state.dialog.is_some() || view_state.confirm_quit {
        return None;
    }

    let rows = view_state.ranking_rows();
    match mouse_event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let table = league_layout(build_layout(view_state.viewport).body).table;
            if mouse_event.column < table.x || mouse_event.column >= table.right() {
                return None;
            }
            if let Some(index) = liga_core::ranking::row_at(mouse_event.row, &rows) {
                view_state.ranking_selected = index;
                view_state.drag.pick_up(index);
            }
            None
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            view_state.drag.hover_at(mouse_event.row, &rows);
            if let Some(target) = view_state.drag.target() {
                view_state.ranking_selected = target;
            }
            None
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let drop = view_state.drag.release()?;
            view_state.ranking_selected = drop.to;
            Some(UserCommand::Reorder {
                league_id,
                from: drop.from,
                to: drop.to,
            })
        }
        MouseEventKind::ScrollUp => {
            view_state.ranking_offset = view_state.ranking_offset.saturating_sub(1);
            None
        }
        MouseEventKind::ScrollDown => {
            let capacity = view_state.ranking_capacity();
            let max_offset = view_state.teams().len().saturating_sub(capacity);
            view_state.ranking_offset = (view_state.ranking_offset + 1).min(max_offset);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
