// Screen layout: fixed bars around a route-specific body.
//
// +--------------------------------------------------+
// | Header (1 row)                                    |
// +--------------------------------------------------+
// | Body (fill)                                       |
// |   home:   country tabs (3) / league list          |
// |   league: title (3) / ranking table               |
// |   login:  centered form                           |
// +--------------------------------------------------+
// | Status line (1 row)                               |
// | Help bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Resolved screen areas shared by every route.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// App title, greeting and session controls.
    pub header: Rect,
    pub body: Rect,
    /// Last error or notice.
    pub status: Rect,
    /// Key hints for the current route.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(5),    // body
            Constraint::Length(1), // status line
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        header: vertical[0],
        body: vertical[1],
        status: vertical[2],
        help_bar: vertical[3],
    }
}

/// Home body: country tabs above the league list.
#[derive(Debug, Clone, Copy)]
pub struct HomeLayout {
    pub tabs: Rect,
    pub list: Rect,
}

pub fn home_layout(body: Rect) -> HomeLayout {
    let parts = Layout::vertical([Constraint::Length(3), Constraint::Min(2)]).split(body);
    HomeLayout {
        tabs: parts[0],
        list: parts[1],
    }
}

/// League body: title block above the ranking table.
#[derive(Debug, Clone, Copy)]
pub struct LeagueLayout {
    pub title: Rect,
    pub table: Rect,
}

pub fn league_layout(body: Rect) -> LeagueLayout {
    let parts = Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).split(body);
    LeagueLayout {
        title: parts[0],
        table: parts[1],
    }
}

/// Compute a centered rectangle of the given size within `area`, clamped to
/// the space available.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 100, 30)
    }

    #[test]
    fn bars_are_one_row_and_body_fills() {
        let layout = build_layout(test_area());
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.body.height, 27);
        assert_eq!(layout.body.y, 1);
        assert_eq!(layout.help_bar.y, 29);
    }

    #[test]
    fn league_table_sits_below_title() {
        let body = build_layout(test_area()).body;
        let league = league_layout(body);
        assert_eq!(league.title.height, 3);
        assert_eq!(league.table.y, body.y + 3);
        assert_eq!(league.table.height, body.height - 3);
    }

    #[test]
    fn home_list_sits_below_tabs() {
        let body = build_layout(test_area()).body;
        let home = home_layout(body);
        assert_eq!(home.tabs.height, 3);
        assert_eq!(home.list.y, body.y + 3);
    }

    #[test]
    fn centered_rect_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 80, 24);
        let r = centered_rect(40, 10, area);
        assert_eq!((r.width, r.height), (40, 10));
        assert_eq!(r.x, 20);
        assert_eq!(r.y, 7);

        let small = centered_rect(40, 10, Rect::new(0, 0, 10, 3));
        assert!(small.width <= 10 && small.height <= 3);
    }
}
