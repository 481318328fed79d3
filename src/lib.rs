pub mod commands;
pub mod config;
pub mod grade;
pub mod llm;
pub mod logging;
pub mod palette;
pub mod prompt;
pub mod tui;
pub mod utils;
