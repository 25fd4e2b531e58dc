//! Rules command - inspect and validate classification rule tables.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;

use docid_core::{DocumentPipeline, RuleTable};

use super::load_config;

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    command: RulesCommand,
}

#[derive(Subcommand)]
enum RulesCommand {
    /// Print the active rule table
    Show,

    /// Validate a rule table file
    Check {
        /// Rule table (JSON)
        path: PathBuf,
    },

    /// Show per-rule keyword scores for a text file
    Score {
        /// Text file, one OCR line per line
        input: PathBuf,
    },
}

pub async fn run(args: RulesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        RulesCommand::Show => show_rules(config_path),
        RulesCommand::Check { path } => check_rules(config_path, &path),
        RulesCommand::Score { input } => score_text(config_path, &input),
    }
}

fn show_rules(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let table = match &config.rules_path {
        Some(path) => RuleTable::from_file(path)
            .with_context(|| format!("Failed to load rule table {}", path.display()))?,
        None => RuleTable::builtin()?,
    };

    println!("{}", table.to_json_pretty()?);
    Ok(())
}

fn check_rules(config_path: Option<&str>, path: &PathBuf) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let table = RuleTable::from_file(path)
        .with_context(|| format!("Invalid rule table {}", path.display()))?;

    // Building a pipeline compiles every pattern
    DocumentPipeline::with_rules(config, &table)
        .with_context(|| format!("Invalid rule table {}", path.display()))?;

    println!(
        "{} {} is valid ({} rules, {} priority signals)",
        style("✓").green(),
        path.display(),
        table.rules.len(),
        table.priority.len()
    );
    Ok(())
}

fn score_text(config_path: Option<&str>, input: &PathBuf) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let pipeline = DocumentPipeline::new(config)?;
    let normalized = pipeline.normalizer().normalize(&text);

    for score in pipeline.classifier().scores(&normalized) {
        match score.vetoed_by {
            Some(token) => println!(
                "{:<16} {:>3}  {}",
                score.rule_id,
                score.score,
                style(format!("vetoed by {}", token)).yellow()
            ),
            None => println!("{:<16} {:>3}", score.rule_id, score.score),
        }
    }

    match pipeline.classifier().classify(&normalized) {
        Some(result) => println!("\n{} {}", style("→").green(), result.rule_id),
        None => println!("\n{} unknown", style("→").yellow()),
    }

    Ok(())
}
