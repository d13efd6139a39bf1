// TUI widget modules, one per screen region or overlay.

pub mod header;
pub mod help_bar;
pub mod league_dialog;
pub mod league_list;
pub mod login;
pub mod quit_confirm;
pub mod ranking;
