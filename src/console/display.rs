use chrono::Local;
use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::inventory::{ModelDetails, ModelIndex, ScanSummary, ValidationResult};

fn header(title: &str) -> Cell {
    Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn detail_cells(details: Option<&ModelDetails>) -> Vec<Cell> {
    match details {
        Some(d) => vec![
            Cell::new(&d.display_name).fg(Color::Green),
            Cell::new(&d.architecture_name).fg(Color::Magenta).set_alignment(CellAlignment::Center),
            Cell::new(&d.architecture_version).fg(Color::Blue).set_alignment(CellAlignment::Center),
            Cell::new(&d.dataset_name).fg(Color::White),
            Cell::new(&d.evaluation_binary_name).fg(Color::DarkGrey),
        ],
        None => {
            let mut cells = vec![Cell::new("pending").fg(Color::Yellow)];
            cells.extend((0..4).map(|_| Cell::new("")));
            cells
        }
    }
}

/// Displays the model index as a table, one row per model.
///
/// Tiered models without details are shown as pending. Described
/// executables outside both tiers are listed last.
pub fn display_index_table(index: &ModelIndex) {
    let untiered: Vec<&String> = index.details
        .keys()
        .filter(|id| !index.root.contains(*id) && !index.leaves.contains(*id))
        .collect();

    if index.root.is_empty() && index.leaves.is_empty() && untiered.is_empty() {
        println!("{}", "No models found in the models directory".yellow());
        return;
    }

    let mut table = Table::new();
    table
        .set_header(vec![
            header("Tier"),
            header("Identifier"),
            header("Name"),
            header("Architecture"),
            header("Version"),
            header("Dataset"),
            header("Evaluation binary"),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let rows = index.root.iter().map(|id| ("root", id))
        .chain(index.leaves.iter().map(|id| ("leaves", id)))
        .chain(untiered.into_iter().map(|id| ("-", id)));

    for (tier, id) in rows {
        let mut row = vec![
            Cell::new(tier).fg(Color::White).set_alignment(CellAlignment::Center),
            Cell::new(id).fg(Color::Yellow),
        ];
        row.extend(detail_cells(index.details.get(id)));
        table.add_row(row);
    }

    println!("\n{}", table);
    println!("{}", "=".repeat(100).bright_black());
    println!(
        "{}",
        format!(
            "Root models: {}  Leaves models: {}  Described: {}",
            index.root.len(),
            index.leaves.len(),
            index.described()
        ).bright_green()
    );
}

/// Prints the outcome of a model check.
pub fn display_scan_summary(summary: &ScanSummary) {
    let started = summary.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
    println!(
        "{} {} root, {} leaves, {} described ({} ms, started {})",
        "Model check complete:".bright_green(),
        summary.root,
        summary.leaves,
        summary.described,
        summary.elapsed_ms,
        started
    );
    if !summary.failed.is_empty() {
        println!("{}", "Models that did not describe themselves:".yellow());
        for id in &summary.failed {
            println!("  - {}", id.red());
        }
    }
}

/// Prints a validation result.
pub fn display_validation(result: &ValidationResult) {
    match result {
        ValidationResult::Good => println!("{}", "All model executables are valid".bright_green()),
        ValidationResult::Error { invalid_executables } => {
            println!("{}", "Invalid model executables:".red().bold());
            for filename in invalid_executables {
                println!("  - {}", filename);
            }
        }
    }
}

/// Prints the operation ids the UI may enable.
pub fn display_operations(ids: &[String]) {
    if ids.is_empty() {
        println!("{}", "No operations available".yellow());
        return;
    }
    println!("{}", "Available operations:".cyan().bold());
    for id in ids {
        println!("  {}", id);
    }
}
