use crate::infra::parse_date;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use drivetuning::config::AppConfig;
use drivetuning::error::AppError;
use drivetuning::legality::{
    legal_references, regional_rule_report, tuv_readiness, Modification, ReferenceCatalog,
    RegionalRuleReport, TuvReadiness, WireLabel,
};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RulesArgs {
    /// Federal state code such as BY or NW
    #[arg(long)]
    pub(crate) state: String,
    /// Part categories to match; repeat or comma separate
    #[arg(long, value_delimiter = ',')]
    pub(crate) category: Vec<String>,
    /// Evaluation date for rule expiry (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReferencesArgs {
    /// Rule identifier, e.g. exhaust_noise or regional_by_kesselberg_noise
    pub(crate) rule_id: String,
}

#[derive(Args, Debug)]
pub(crate) struct ReadinessArgs {
    /// JSON file holding either a list of modifications or `{ "modifications": [...] }`
    pub(crate) file: PathBuf,
    /// Emit JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModificationFile {
    List(Vec<Modification>),
    Wrapped { modifications: Vec<Modification> },
}

impl ModificationFile {
    fn into_modifications(self) -> Vec<Modification> {
        match self {
            ModificationFile::List(modifications) => modifications,
            ModificationFile::Wrapped { modifications } => modifications,
        }
    }
}

fn load_catalog() -> Result<ReferenceCatalog, AppError> {
    let config = AppConfig::load()?;
    Ok(ReferenceCatalog::from_paths(
        config.datasets.references_path.as_deref(),
        config.datasets.regional_rules_path.as_deref(),
    )?)
}

fn evaluation_instant(today: Option<NaiveDate>) -> DateTime<Utc> {
    today
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .unwrap_or_else(Utc::now)
}

pub(crate) fn run_rules_report(args: RulesArgs) -> Result<(), AppError> {
    let catalog = load_catalog()?;
    let report = regional_rule_report(
        &catalog,
        Some(args.state.as_str()),
        &args.category,
        evaluation_instant(args.today),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_rules_report(&report));
    }
    Ok(())
}

pub(crate) fn run_references_lookup(args: ReferencesArgs) -> Result<(), AppError> {
    let catalog = load_catalog()?;
    let references = legal_references(&catalog, &args.rule_id);

    if references.is_empty() {
        println!("No legal references recorded for '{}'.", args.rule_id);
        return Ok(());
    }

    println!("Legal references for '{}':", args.rule_id);
    for reference in references {
        let title = reference
            .short_title
            .as_deref()
            .unwrap_or(&reference.law_title);
        match reference.notes.as_deref() {
            Some(notes) => println!("- {title} {} ({notes})", reference.section),
            None => println!("- {title} {}", reference.section),
        }
        if let Some(url) = reference.url.as_deref() {
            println!("  {url}");
        }
    }
    Ok(())
}

pub(crate) fn run_readiness_report(args: ReadinessArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.file)?;
    let modifications = serde_json::from_str::<ModificationFile>(&raw)?.into_modifications();
    let readiness = tuv_readiness(&modifications);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&readiness)?);
    } else {
        print!("{}", render_readiness(&readiness));
    }
    Ok(())
}

fn render_rules_report(report: &RegionalRuleReport) -> String {
    let state = report.state_id.as_deref().unwrap_or("-");
    let mut output = format!(
        "Regional rules for {state}: {} total, {} critical\n",
        report.count, report.critical_count
    );
    for rule in &report.rules {
        output.push_str(&format!(
            "- [{}] {} ({})\n",
            rule.severity.label(),
            rule.name_de,
            rule.id
        ));
    }
    if !report.warnings.is_empty() {
        output.push_str("Warnings:\n");
        for warning in &report.warnings {
            output.push_str(&format!("  {warning}\n"));
        }
    }
    output
}

fn render_readiness(readiness: &TuvReadiness) -> String {
    let mut output = format!(
        "TÜV readiness: {} (score {})\n",
        readiness.status.label(),
        readiness.score
    );
    output.push_str(&format!(
        "Parts: {} green, {} yellow, {} red, {} unclassified; {} missing approvals\n",
        readiness.counts.green,
        readiness.counts.yellow,
        readiness.counts.red,
        readiness.counts.unclassified,
        readiness.missing_approvals
    ));
    for action in &readiness.actions {
        output.push_str(&format!("- {action}\n"));
    }
    output
}
