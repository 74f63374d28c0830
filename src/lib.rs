// Codefolio library - exposes all core modules for testing

pub mod achievements;
pub mod app;
pub mod config;
pub mod files;
pub mod konami;
pub mod palette;
pub mod storage;
pub mod terminal;
pub mod theme;
pub mod time_source;
pub mod ui;
