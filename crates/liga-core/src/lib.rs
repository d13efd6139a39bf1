// Library root: domain model, configuration, local persistence and the
// pure logic shared by the backend clients, the app layer and the TUI.

pub mod config;
pub mod db;
pub mod edit;
pub mod form;
pub mod i18n;
pub mod model;
pub mod protocol;
pub mod ranking;

pub use i18n::t;
