use std::error::Error;
use std::io::Write;
use rustyline::DefaultEditor;

use crate::config::Settings;
use super::command_handlers::{
    ConsoleContext,
    handle_check_models,
    handle_list_models,
    handle_list_operations,
    handle_validate,
};

const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const BRIGHT_CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";

fn print_help() {
    println!("\n{CYAN}ipheno Console Commands{RESET}");
    println!("{BRIGHT_CYAN}{}{RESET}", "=".repeat(60));
    println!("{GREEN}exit, bye, quit{RESET} - Exit the console");
    println!("{GREEN}help{RESET}            - Show this help message");
    println!("{GREEN}clear{RESET}           - Clear the screen");
    println!("{GREEN}models{RESET}          - Show the current model index");
    println!("{GREEN}check{RESET}           - Rescan the models directory and rebuild the index");
    println!("{GREEN}validate{RESET}        - Check that every model executable answers correctly");
    println!("{GREEN}operations{RESET}      - List the operation ids that can be selected");
    println!();
}

// --- Main Console Loop ---

pub async fn console_loop(settings: &Settings) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting console session");
    print_help();

    let mut rl = DefaultEditor::new()?;
    let client = reqwest::Client::new();
    let server_url = settings.server_url();
    let context = ConsoleContext {
        client: &client,
        server_url: &server_url,
    };

    loop {
        match rl.readline("> ") {
            Ok(input) => {
                let input_trimmed = input.trim();
                if input_trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input_trimmed);

                match input_trimmed.to_lowercase().as_str() {
                    "exit" | "bye" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => print_help(),
                    "clear" => {
                        print!("\x1B[2J\x1B[1;1H");
                        std::io::stdout().flush()?;
                    }
                    "models" => handle_list_models(&context).await,
                    "check" => handle_check_models(&context).await,
                    "validate" => handle_validate(&context).await,
                    "operations" => handle_list_operations(&context).await,
                    other => println!("Unknown command: {}. Type 'help' to see available commands.", other),
                }
            }
            Err(_) => {
                println!("Goodbye!");
                break;
            }
        }
    }
    Ok(())
}
