// Presentation layer - Terminal UI, key bindings and prompt commands
pub mod app_state;
pub mod commands;
pub mod console;
pub mod render;
