//! Apply command - merge feedback and export the transformed data.

use std::path::PathBuf;

use colored::Colorize;
use steward::input::write_dataset;
use steward::merge::parse_feedback;
use steward::{ColumnOutcome, Steward, StewardConfig};

use super::{require_file, sibling};
use crate::cli::OutputFormatChoice;

pub fn run(
    file: PathBuf,
    feedback: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormatChoice,
    report: Option<PathBuf>,
    config: StewardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;
    require_file(&feedback)?;

    let steward = Steward::with_config(config);
    let (dataset, source) = steward.load(&file)?;
    let feedback = parse_feedback(&std::fs::read_to_string(&feedback)?)?;

    println!(
        "{} {} feedback entries to {}",
        "Applying".cyan().bold(),
        feedback.len(),
        source.file.white()
    );

    let response = steward.apply(&dataset, &feedback)?;

    let output_path = output.unwrap_or_else(|| sibling(&file, &format!("steward.{}", format)));
    write_dataset(&response.dataset, &output_path, format.into())?;

    if let Some(path) = &report {
        std::fs::write(path, serde_json::to_string_pretty(&response)?)?;
    }

    println!();
    for column in &response.report.columns {
        let outcome = match column.outcome {
            ColumnOutcome::Applied => "applied".green(),
            ColumnOutcome::Skipped => "skipped".dimmed(),
            ColumnOutcome::Failed => "failed".red(),
        };
        let mut line = format!("  {:24} {:11} {}", column.column, column.action.to_string(), outcome);
        if column.outcome == ColumnOutcome::Applied {
            line.push_str(&format!(" ({} cells)", column.cells_changed));
        }
        if let Some(derived) = &column.derived_column {
            line.push_str(&format!(" -> {}", derived));
        }
        if column.outcome == ColumnOutcome::Failed {
            if let Some(reason) = &column.reason {
                line.push_str(&format!(": {}", reason));
            }
        }
        println!("{}", line);
    }

    let summary = &response.report;
    println!();
    println!(
        "Rows: {} -> {}, columns: {} -> {}",
        summary.rows_before, summary.rows_after, summary.columns_before, summary.columns_after
    );
    println!(
        "{} applied, {} skipped, {} failed",
        summary.count(ColumnOutcome::Applied).to_string().green(),
        summary.count(ColumnOutcome::Skipped),
        summary.count(ColumnOutcome::Failed).to_string().red()
    );
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );
    if let Some(path) = report {
        println!(
            "{} {}",
            "Report".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}
