//! Recommend command - propose actions, optionally arbitrated by a judge.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use steward::{
    CancellationToken, Judge, JudgeConfig, JudgeVerdict, MockJudge, OllamaJudge, OpenAiJudge,
    Steward, StewardConfig,
};

use super::require_file;
use crate::cli::JudgeChoice;

/// Judge flags from the command line.
pub struct JudgeOptions {
    pub judge: JudgeChoice,
    pub model: Option<String>,
    pub batch: bool,
}

impl JudgeOptions {
    fn build(&self, base: &JudgeConfig) -> Result<Option<Arc<dyn Judge>>, Box<dyn std::error::Error>> {
        let mut config = base.clone().with_env_overrides();
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if self.batch {
            config = config.with_batch(true);
        }

        let judge: Arc<dyn Judge> = match self.judge {
            JudgeChoice::None => return Ok(None),
            JudgeChoice::OpenAI => Arc::new(OpenAiJudge::from_env(config)?),
            JudgeChoice::Ollama => Arc::new(OllamaJudge::new(config)?),
            JudgeChoice::Mock => Arc::new(MockJudge::new().with_config(config)),
        };
        Ok(Some(judge))
    }

    /// Line announcing the judge; none in JSON mode so stdout stays a document.
    fn banner(&self, judge: &dyn Judge, json: bool) -> Option<String> {
        let model = judge.config().model.as_deref().unwrap_or("default model");
        tracing::info!(judge = %self.judge, model, "judge enabled");
        (!json).then(|| format!("{} {} ({})", "Judge".cyan().bold(), self.judge, model))
    }
}

pub fn run(
    file: PathBuf,
    options: JudgeOptions,
    output: Option<PathBuf>,
    json: bool,
    config: StewardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;

    let judge = options.build(&config.judge)?;
    let mut steward = Steward::with_config(config);
    if let Some(judge) = judge {
        if let Some(banner) = options.banner(judge.as_ref(), json) {
            println!("{}", banner);
        }
        steward = steward.with_judge(judge);
    }

    let (dataset, source) = steward.load(&file)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || on_interrupt.cancel())?;

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let response = runtime.block_on(steward.recommend_with_judge(&dataset, &cancel))?;

    if let Some(path) = &output {
        std::fs::write(path, serde_json::to_string_pretty(&response)?)?;
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns)",
        "Recommendations for".cyan().bold(),
        source.file.white(),
        response.summary.row_count,
        response.summary.column_count
    );
    println!();

    for (name, column) in &response.columns {
        if column.candidates.is_empty() {
            println!("{} {}", name.bold(), "keep".dimmed());
            continue;
        }
        println!("{}", name.bold());
        for rec in &column.candidates {
            let value = rec
                .suggested_value()
                .map(|v| format!(" [{}]", v))
                .unwrap_or_default();
            println!("  {:11}{} {}", rec.action.to_string().yellow(), value, rec.reason.dimmed());
        }
        match &column.judge {
            Some(JudgeVerdict::Accepted { action, value, .. }) => println!(
                "  {} {}{}",
                "judge:".green(),
                action,
                value.as_deref().map(|v| format!(" [{}]", v)).unwrap_or_default()
            ),
            Some(JudgeVerdict::NoPlan { reason }) => {
                println!("  {} {}", "judge: no plan -".red(), reason)
            }
            None => {}
        }
    }

    println!();
    println!(
        "{} of {} columns have candidates",
        response.flagged_columns().to_string().white().bold(),
        response.columns.len()
    );
    if let Some(path) = output {
        println!(
            "{} {}",
            "Saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_options() -> JudgeOptions {
        JudgeOptions {
            judge: JudgeChoice::Mock,
            model: Some("tiny".to_string()),
            batch: false,
        }
    }

    #[test]
    fn test_no_judge_builds_nothing() {
        let options = JudgeOptions {
            judge: JudgeChoice::None,
            model: None,
            batch: false,
        };
        assert!(options.build(&JudgeConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_banner_is_silent_in_json_mode() {
        let options = mock_options();
        let judge = options.build(&JudgeConfig::default()).unwrap().unwrap();
        assert_eq!(options.banner(judge.as_ref(), true), None);

        let banner = options.banner(judge.as_ref(), false).unwrap();
        assert!(banner.contains("mock"));
        assert!(banner.contains("tiny"));
    }
}
