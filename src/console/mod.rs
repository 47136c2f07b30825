// Table and message rendering shared with the one-shot CLI commands
pub mod display;

// The interactive loop
mod console;

mod command_handlers;

pub use console::console_loop;
