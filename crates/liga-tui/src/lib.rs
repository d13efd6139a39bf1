// Terminal UI: screens, dialogs, input handling and rendering.
//
// The TUI owns a `ViewState` that mirrors what the orchestrator has told it.
// The orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream};
use futures_util::StreamExt;
use ratatui::layout::Rect;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use liga_core::form::{LeagueForm, LoginForm};
use liga_core::model::{filter_by_country, Country, League, LeagueDetail, LeagueId, SessionState, Team};
use liga_core::protocol::{Route, UiUpdate, UserCommand};
use liga_core::ranking::{DragState, RowBounds};
use liga_core::t;

use layout::{build_layout, league_layout};

// ---------------------------------------------------------------------------
// Screen state
// ---------------------------------------------------------------------------

/// What the league screen currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailView {
    #[default]
    Empty,
    Loading(LeagueId),
    NotFound(LeagueId),
    Loaded(LeagueDetail),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogField {
    #[default]
    Name,
    TeamInput,
    Teams,
}

impl DialogField {
    pub fn next(self) -> Self {
        match self {
            DialogField::Name => DialogField::TeamInput,
            DialogField::TeamInput => DialogField::Teams,
            DialogField::Teams => DialogField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            DialogField::Name => DialogField::Teams,
            DialogField::TeamInput => DialogField::Name,
            DialogField::Teams => DialogField::TeamInput,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogKind {
    Create { country: Country },
    Edit { league_id: LeagueId },
}

/// An open create or edit dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogState {
    pub kind: DialogKind,
    pub form: LeagueForm,
    pub focus: DialogField,
    /// Highlighted entry of the team list.
    pub selected_team: usize,
}

impl DialogState {
    pub fn create(country: Country) -> Self {
        DialogState {
            kind: DialogKind::Create { country },
            form: LeagueForm::for_create(),
            focus: DialogField::Name,
            selected_team: 0,
        }
    }

    pub fn edit(detail: &LeagueDetail) -> Self {
        DialogState {
            kind: DialogKind::Edit {
                league_id: detail.league.id.clone(),
            },
            form: LeagueForm::for_edit(&detail.league, &detail.teams),
            focus: DialogField::Name,
            selected_team: 0,
        }
    }

    pub fn title(&self) -> String {
        match &self.kind {
            DialogKind::Create { country } => t(
                "league.dialogTitle",
                &[("country", &t(country.label_key(), &[]))],
            ),
            DialogKind::Edit { .. } => t("league.editTitle", &[]),
        }
    }

    pub fn submit_label(&self) -> String {
        match self.kind {
            DialogKind::Create { .. } => t("league.create", &[]),
            DialogKind::Edit { .. } => t("league.save", &[]),
        }
    }

    /// Mark the form as saving and build the command, if the form can be
    /// submitted.
    pub fn submit(&mut self) -> Option<UserCommand> {
        if !self.form.can_submit() {
            return None;
        }
        self.form.begin_save();
        let name = self.form.trimmed_name();
        Some(match &self.kind {
            DialogKind::Create { country } => UserCommand::CreateLeague {
                name,
                country: *country,
                team_names: self.form.team_names(),
            },
            DialogKind::Edit { league_id } => UserCommand::SaveLeagueEdits {
                league_id: league_id.clone(),
                name,
                teams: self.form.teams.clone(),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state mirroring the orchestrator, plus purely local input
/// state (selection, focus, drag).
#[derive(Debug, Clone)]
pub struct ViewState {
    pub route: Route,
    pub session: SessionState,
    pub country: Country,
    /// All leagues, oldest first; the home screen shows those of `country`.
    pub leagues: Vec<League>,
    pub league_selected: usize,
    pub detail: DetailView,
    pub ranking_selected: usize,
    /// First ranking row scrolled into view.
    pub ranking_offset: usize,
    pub drag: DragState,
    pub login: LoginForm,
    pub login_focus: LoginField,
    pub dialog: Option<DialogState>,
    /// Error or notice shown in the status line.
    pub status: Option<String>,
    pub confirm_quit: bool,
    /// Terminal area of the last frame; used to hit-test mouse events.
    pub viewport: Rect,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            route: Route::Home,
            session: SessionState::loading(),
            country: Country::De,
            leagues: Vec::new(),
            league_selected: 0,
            detail: DetailView::Empty,
            ranking_selected: 0,
            ranking_offset: 0,
            drag: DragState::Idle,
            login: LoginForm::default(),
            login_focus: LoginField::Email,
            dialog: None,
            status: None,
            confirm_quit: false,
            viewport: Rect::new(0, 0, 80, 24),
        }
    }
}

impl ViewState {
    /// Leagues of the selected country tab.
    pub fn visible_leagues(&self) -> Vec<League> {
        filter_by_country(&self.leagues, self.country)
    }

    pub fn selected_league(&self) -> Option<League> {
        self.visible_leagues().get(self.league_selected).cloned()
    }

    pub fn loaded(&self) -> Option<&LeagueDetail> {
        match &self.detail {
            DetailView::Loaded(detail) => Some(detail),
            _ => None,
        }
    }

    /// Teams of the loaded league in ranking order.
    pub fn teams(&self) -> &[Team] {
        self.loaded().map(|d| d.teams.as_slice()).unwrap_or(&[])
    }

    /// Ranking rows that fit on screen.
    pub fn ranking_capacity(&self) -> usize {
        let body = build_layout(self.viewport).body;
        widgets::ranking::visible_rows(league_layout(body).table)
    }

    /// Screen bounds of every ranking row (hidden rows match nothing).
    pub fn ranking_rows(&self) -> Vec<RowBounds> {
        let body = build_layout(self.viewport).body;
        widgets::ranking::row_bounds(
            league_layout(body).table,
            self.ranking_offset,
            self.teams().len(),
        )
    }

    /// Scroll so `ranking_selected` is on screen.
    pub fn scroll_ranking_to_selection(&mut self) {
        let capacity = self.ranking_capacity().max(1);
        if self.ranking_selected < self.ranking_offset {
            self.ranking_offset = self.ranking_selected;
        } else if self.ranking_selected >= self.ranking_offset + capacity {
            self.ranking_offset = self.ranking_selected + 1 - capacity;
        }
    }

    fn clamp_selections(&mut self) {
        let leagues = self.visible_leagues().len();
        self.league_selected = self.league_selected.min(leagues.saturating_sub(1));
        let teams = self.teams().len();
        self.ranking_selected = self.ranking_selected.min(teams.saturating_sub(1));
        self.ranking_offset = self.ranking_offset.min(self.ranking_selected);
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Session(session) => {
            state.session = session;
        }
        UiUpdate::Navigate(route) => {
            let keep = matches!(
                (&route, &state.detail),
                (Route::League(id), DetailView::Loaded(d)) if &d.league.id == id
            );
            if let Route::League(id) = &route {
                if !keep {
                    state.detail = DetailView::Loading(id.clone());
                    state.ranking_selected = 0;
                    state.ranking_offset = 0;
                }
            } else {
                state.detail = DetailView::Empty;
            }
            if route == Route::Login {
                state.login = LoginForm::default();
                state.login_focus = LoginField::Email;
            }
            state.route = route;
            state.drag.cancel();
            state.dialog = None;
            state.status = None;
        }
        UiUpdate::Country(country) => {
            if state.country != country {
                state.league_selected = 0;
            }
            state.country = country;
        }
        UiUpdate::Leagues(leagues) => {
            state.leagues = leagues;
            state.clamp_selections();
        }
        UiUpdate::LeagueLoaded { id, detail } => {
            // Results for a league we navigated away from are dropped.
            if state.route != Route::League(id.clone()) {
                debug!("Discarding stale load of league {}", id);
                return;
            }
            state.detail = match detail {
                Some(detail) => DetailView::Loaded(*detail),
                None => DetailView::NotFound(id),
            };
            state.drag.cancel();
            state.clamp_selections();
        }
        UiUpdate::Teams { league_id, teams } => {
            set_teams(state, &league_id, teams);
        }
        UiUpdate::ReorderFailed {
            league_id,
            teams,
            message,
        } => {
            set_teams(state, &league_id, teams);
            state.status = Some(message);
        }
        UiUpdate::LoginFailed(message) => {
            state.login.loading = false;
            state.login.error = Some(message);
        }
        UiUpdate::SignUpPending => {
            state.login.loading = false;
            state.login.message = Some(t("auth.signupSuccess", &[]));
        }
        UiUpdate::DialogSaved => {
            state.dialog = None;
        }
        UiUpdate::DialogFailed(message) => match state.dialog.as_mut() {
            Some(dialog) => dialog.form.fail_save(message),
            None => state.status = Some(message),
        },
        UiUpdate::Error(message) => {
            state.status = Some(message);
        }
    }
}

fn set_teams(state: &mut ViewState, league_id: &LeagueId, teams: Vec<Team>) {
    if let DetailView::Loaded(detail) = &mut state.detail {
        if &detail.league.id == league_id {
            detail.teams = teams;
        }
    }
    state.clamp_selections();
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame for the current route, with any dialog or
/// quit confirmation on top.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::header::render(frame, layout.header, state);
    match &state.route {
        Route::Home => widgets::league_list::render(frame, layout.body, state),
        Route::Login => widgets::login::render(frame, layout.body, state),
        Route::League(_) => widgets::ranking::render(frame, layout.body, state),
    }
    widgets::help_bar::render_status(frame, layout.status, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(dialog) = &state.dialog {
        widgets::league_dialog::render(frame, frame.area(), dialog);
    }
    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen, mouse capture).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, terminal input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    if let Err(e) = crossterm::execute!(std::io::stdout(), EnableMouseCapture) {
        warn!("Mouse capture unavailable: {}", e);
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            // UI updates from the orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Channel closed: app is shutting down
                    None => break Ok(()),
                }
            }

            // Terminal input
            maybe_event = event_stream.next() => {
                let cmd = match maybe_event {
                    Some(Ok(Event::Key(key_event))) => input::handle_key(key_event, &mut view_state),
                    Some(Ok(Event::Mouse(mouse_event))) => input::handle_mouse(mouse_event, &mut view_state),
                    Some(Ok(Event::Resize(width, height))) => {
                        view_state.viewport = Rect::new(0, 0, width, height);
                        None
                    }
                    Some(Ok(_)) => None,
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input failed")),
                    None => break Ok(()),
                };
                if let Some(cmd) = cmd {
                    let quit = cmd == UserCommand::Quit;
                    let _ = cmd_tx.send(cmd).await;
                    if quit {
                        break Ok(());
                    }
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| {
                    view_state.viewport = frame.area();
                    render_frame(frame, &view_state);
                }) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
