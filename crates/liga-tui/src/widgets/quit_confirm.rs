// Quit confirmation overlay widget.
//
// Drawn on top of everything else while `ViewState::confirm_quit` is set.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use liga_core::t;

use crate::layout::centered_rect;

const DIALOG_WIDTH: u16 = 32;
const DIALOG_HEIGHT: u16 = 3;

pub fn render(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            format!(" {} ", t("common.quit", &[])),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(format!(" {}", t("common.quitConfirm", &[])))
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}
