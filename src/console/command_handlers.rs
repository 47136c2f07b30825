use colored::*;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::console::display::{
    display_index_table, display_operations, display_scan_summary, display_validation,
};
use crate::inventory::{ModelIndex, ScanSummary, ValidationResult};
use crate::server::types::ApiResponse;

/// Shared resources for console command handlers
///
/// # Fields
///
/// * `client` - HTTP client used for making API requests to the server
/// * `server_url` - Base URL of the server API
pub(super) struct ConsoleContext<'a> {
    pub client: &'a Client,
    pub server_url: &'a str,
}

/// Unwraps an `ApiResponse` envelope, printing the server's message on error.
fn unwrap_envelope<T: DeserializeOwned>(text: &str) -> Option<T> {
    match serde_json::from_str::<ApiResponse<T>>(text) {
        Ok(response) if response.is_success() => {
            if response.data.is_none() {
                println!("{}", "Server returned no data".yellow());
            }
            response.data
        }
        Ok(response) => {
            println!("Error: {}", response.message.unwrap_or_else(|| "unknown error".to_string()));
            None
        }
        Err(e) => {
            println!("Failed to parse server response: {}", e);
            None
        }
    }
}

pub(super) async fn handle_list_models(context: &ConsoleContext<'_>) {
    match context.client.get(format!("{}/api/v1/models", context.server_url)).send().await {
        Ok(response) => match response.text().await {
            Ok(text) => {
                if let Some(index) = unwrap_envelope::<ModelIndex>(&text) {
                    display_index_table(&index);
                }
            }
            Err(e) => println!("Error reading response: {}", e),
        },
        Err(e) => println!("Error requesting models: {}", e),
    }
}

pub(super) async fn handle_check_models(context: &ConsoleContext<'_>) {
    println!("Checking models, this may take a while...");
    match context.client.post(format!("{}/api/v1/models/check", context.server_url)).send().await {
        Ok(response) => match response.text().await {
            Ok(text) => {
                if let Some(summary) = unwrap_envelope::<ScanSummary>(&text) {
                    display_scan_summary(&summary);
                }
            }
            Err(e) => println!("Error reading check response: {}", e),
        },
        Err(e) => println!("Error sending check request: {}", e),
    }
}

pub(super) async fn handle_validate(context: &ConsoleContext<'_>) {
    match context.client.get(format!("{}/api/v1/models/validate", context.server_url)).send().await {
        Ok(response) => match response.text().await {
            // The validation route answers with the bare result on success
            Ok(text) => match serde_json::from_str::<ValidationResult>(&text) {
                Ok(result) => display_validation(&result),
                Err(_) => {
                    let _ = unwrap_envelope::<()>(&text);
                }
            },
            Err(e) => println!("Error reading validation response: {}", e),
        },
        Err(e) => println!("Error requesting validation: {}", e),
    }
}

pub(super) async fn handle_list_operations(context: &ConsoleContext<'_>) {
    match context.client.get(format!("{}/api/v1/operations", context.server_url)).send().await {
        Ok(response) => match response.text().await {
            Ok(text) => {
                if let Some(ids) = unwrap_envelope::<Vec<String>>(&text) {
                    display_operations(&ids);
                }
            }
            Err(e) => println!("Error reading response: {}", e),
        },
        Err(e) => println!("Error requesting operations: {}", e),
    }
}
