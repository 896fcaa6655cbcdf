//! Quality command - score a data file.

use std::path::PathBuf;

use colored::Colorize;
use steward::{QualityCategory, Steward, StewardConfig};

use super::{colored_score, require_file};

pub fn run(file: PathBuf, json: bool, config: StewardConfig) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;

    let steward = Steward::with_config(config);
    let (dataset, source) = steward.load(&file)?;
    let response = steward.quality(&dataset);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let quality = &response.quality;
    println!(
        "{} {} ({} rows, {} columns, {})",
        "Quality".cyan().bold(),
        source.file.white(),
        response.summary.row_count,
        response.summary.column_count,
        source.format
    );
    println!();

    let category = format!("{:?}", quality.category);
    let category = match quality.category {
        QualityCategory::Excellent | QualityCategory::Good => category.green(),
        QualityCategory::Fair => category.yellow(),
        QualityCategory::Poor | QualityCategory::Critical => category.red(),
    };
    println!(
        "Overall score: {} / 100 ({})",
        colored_score(quality.overall_score).bold(),
        category
    );
    println!("  completeness  {}", colored_score(quality.factors.completeness));
    println!("  duplicates    {}", colored_score(quality.factors.duplicates));
    println!("  consistency   {}", colored_score(quality.factors.consistency));
    println!(
        "  duplicate rows: {} of {}",
        quality.duplicates.duplicate_rows, response.profile.row_count
    );

    println!();
    println!(
        "{}",
        format!("{:24} {:12} {:>10} {:>8} {:>8}", "column", "type", "complete%", "invalid", "null").bold()
    );
    for column in &quality.columns {
        let declared = if column.type_declared { "*" } else { "" };
        println!(
            "{:24} {:12} {:>10} {:>8} {:>8}",
            column.column,
            format!("{}{}", column.data_type.as_str(), declared),
            colored_score(column.completeness_percentage),
            column.invalid_count,
            column.null_count
        );
    }

    println!();
    println!("{}", "Recommendations:".yellow().bold());
    for hint in &quality.recommendations {
        println!("  - {}", hint);
    }

    Ok(())
}
