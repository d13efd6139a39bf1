// Create / edit league dialog overlay.
//
// +-- Neue Liga — Deutschland ----------------+
// | Liga-Name                                  |
// | [ z.B. Bundesliga                        ] |
// | Mannschaften                               |
// | [ Mannschaftsname                        ] |
// | 1. FC Bayern                               |
// | 2. Borussia Dortmund                       |
// | <error>                                    |
// | [Liga erstellen]  Strg+S                   |
// +--------------------------------------------+

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use liga_core::t;

use crate::layout::centered_rect;
use crate::{DialogField, DialogState};

const DIALOG_WIDTH: u16 = 60;
const DIALOG_HEIGHT: u16 = 20;

pub fn render(frame: &mut Frame, area: Rect, dialog: &DialogState) {
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ", dialog.title()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let rows = Layout::vertical([
        Constraint::Length(3), // name
        Constraint::Length(3), // team input
        Constraint::Min(2),    // team list
        Constraint::Length(1), // error
        Constraint::Length(1), // submit
    ])
    .split(inner);

    let form = &dialog.form;
    frame.render_widget(
        input(
            &t("league.name", &[]),
            &form.name,
            &t("league.namePlaceholder", &[]),
            dialog.focus == DialogField::Name,
        ),
        rows[0],
    );
    frame.render_widget(
        input(
            &format!("{} ({})", t("league.teams", &[]), t("common.add", &[])),
            &form.team_input,
            &t("league.teamPlaceholder", &[]),
            dialog.focus == DialogField::TeamInput,
        ),
        rows[1],
    );
    render_teams(frame, rows[2], dialog);

    if let Some(error) = &form.error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red))),
            rows[3],
        );
    }

    let submit = if form.saving {
        Span::styled(t("common.loading", &[]), Style::default().fg(Color::DarkGray))
    } else if form.can_submit() {
        Span::styled(
            format!("[{}] Strg+S", dialog.submit_label()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!("[{}]", dialog.submit_label()),
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            submit,
            Span::styled(
                format!("   [{}] Esc", t("common.cancel", &[])),
                Style::default().fg(Color::Gray),
            ),
        ])),
        rows[4],
    );
}

fn render_teams(frame: &mut Frame, area: Rect, dialog: &DialogState) {
    let focused = dialog.focus == DialogField::Teams;
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        });

    if dialog.form.teams.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                t("league.noTeams", &[]),
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = dialog
        .form
        .teams
        .iter()
        .enumerate()
        .map(|(i, team)| ListItem::new(format!("{}. {}", i + 1, team.name)))
        .collect();
    let mut list = List::new(items).block(block);
    let mut list_state = ListState::default();
    if focused {
        list = list
            .highlight_symbol("▶ ")
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        list_state.select(Some(dialog.selected_team));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn input(label: &str, value: &str, placeholder: &str, focused: bool) -> Paragraph<'static> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let content = if value.is_empty() {
        Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else if focused {
        Span::raw(format!("{value}▏"))
    } else {
        Span::raw(value.to_string())
    };
    Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {label} ")),
    )
}
