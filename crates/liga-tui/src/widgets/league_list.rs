// Home screen: country tabs and the leagues of the selected country.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs};
use ratatui::Frame;

use liga_core::model::Country;
use liga_core::t;

use crate::layout::home_layout;
use crate::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let parts = home_layout(area);
    render_tabs(frame, parts.tabs, state.country);
    render_list(frame, parts.list, state);
}

fn render_tabs(frame: &mut Frame, area: Rect, selected: Country) {
    let titles: Vec<Line> = Country::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| Line::from(format!("{} {}", i + 1, t(c.label_key(), &[]))))
        .collect();
    let index = Country::ALL.iter().position(|c| *c == selected).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(index)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_list(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut block = Block::default().borders(Borders::ALL);
    if state.session.is_admin {
        block = block.title(Span::styled(
            format!(" {} (n) ", t("league.addNew", &[])),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }

    let leagues = state.visible_leagues();
    if leagues.is_empty() {
        let empty = Paragraph::new(Span::styled(
            t("home.noLeagues", &[]),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = leagues
        .iter()
        .map(|l| ListItem::new(Line::from(l.name.clone())))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_symbol("▶ ")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut list_state = ListState::default();
    list_state.select(Some(state.league_selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}
