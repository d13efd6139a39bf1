// League screen: title block and the ranking table.
//
// While a drag is in progress the picked-up row is highlighted and the drop
// target is marked; the order itself only changes on release.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use liga_core::ranking::RowBounds;
use liga_core::t;

use crate::layout::league_layout;
use crate::{DetailView, ViewState};

/// Borders (2) plus the header row.
const TABLE_CHROME: u16 = 3;

/// Number of team rows that fit in `table`.
pub fn visible_rows(table: Rect) -> usize {
    table.height.saturating_sub(TABLE_CHROME) as usize
}

/// Screen bounds of each of `len` rows when the table starts at row
/// `offset`. Rows scrolled out of view get [`RowBounds::HIDDEN`].
pub fn row_bounds(table: Rect, offset: usize, len: usize) -> Vec<RowBounds> {
    // First data row: below the top border and the header.
    let first = table.y + 2;
    let capacity = visible_rows(table);
    (0..len)
        .map(|i| {
            if i < offset || i >= offset + capacity {
                RowBounds::HIDDEN
            } else {
                let y = first + (i - offset) as u16;
                RowBounds { top: y, bottom: y }
            }
        })
        .collect()
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let parts = league_layout(area);

    let detail = match &state.detail {
        DetailView::Loaded(detail) => detail,
        DetailView::NotFound(_) => {
            message(frame, area, t("league.notFound", &[]), Color::Red);
            return;
        }
        DetailView::Loading(_) | DetailView::Empty => {
            message(frame, area, t("common.loading", &[]), Color::DarkGray);
            return;
        }
    };

    let mut title_spans = vec![Span::styled(
        detail.league.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if state.session.is_admin {
        title_spans.push(Span::styled(
            format!("   {} (e)", t("league.edit", &[])),
            Style::default().fg(Color::Green),
        ));
    }
    let title = Paragraph::new(Line::from(title_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" ← {} (Esc) ", t("league.back", &[]))),
    );
    frame.render_widget(title, parts.title);

    let header = Row::new(vec![Cell::from("#"), Cell::from(t("league.teams", &[]))]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let capacity = visible_rows(parts.table);
    let source = state.drag.source();
    let target = state.drag.target().filter(|t| Some(*t) != source);

    let rows: Vec<Row> = detail
        .teams
        .iter()
        .enumerate()
        .skip(state.ranking_offset)
        .take(capacity)
        .map(|(i, team)| {
            let marker = if target == Some(i) { "▸" } else { " " };
            let style = if source == Some(i) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if target == Some(i) {
                Style::default().add_modifier(Modifier::UNDERLINED)
            } else if i == state.ranking_selected && !state.drag.is_dragging() {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{marker}{}", team.position)),
                Cell::from(team.name.clone()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(5), Constraint::Min(10)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", t("league.ranking", &[]))),
        );
    frame.render_widget(table, parts.table);
}

fn message(frame: &mut Frame, area: Rect, text: String, color: Color) {
    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(color)))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}
