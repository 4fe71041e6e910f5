use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use fir_sdk::{
    Access, Block, CaseOverview, CaseRegistry, CaseState, CaseTimeline, PendingRequest,
    RegistryConfig, ValidationReport,
};
use serde::Serialize;

use crate::cli::*;
use crate::script::{Outcome, Script, Session, StepReport, DEMO_SCRIPT};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Demo(args) => {
            let config = with_difficulty(config, args.difficulty)?;
            cmd_session(DEMO_SCRIPT, config, cli.format)
        }
        Command::Run(args) => {
            let content = std::fs::read_to_string(&args.script)
                .with_context(|| format!("failed to read {}", args.script.display()))?;
            let config = with_difficulty(config, args.difficulty)?;
            cmd_session(&content, config, cli.format)
        }
        Command::Config(args) => {
            let config = if args.defaults {
                RegistryConfig::default()
            } else {
                config
            };
            cmd_config(&config, cli.format)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RegistryConfig> {
    match path {
        Some(path) => RegistryConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(RegistryConfig::default()),
    }
}

fn with_difficulty(
    mut config: RegistryConfig,
    difficulty: Option<usize>,
) -> anyhow::Result<RegistryConfig> {
    if let Some(difficulty) = difficulty {
        config.ledger.difficulty = difficulty;
        config.validate()?;
    }
    Ok(config)
}

#[derive(Serialize)]
struct SessionReport<'a> {
    steps: &'a [StepReport],
    validation: &'a ValidationReport,
}

fn cmd_session(script: &str, config: RegistryConfig, format: OutputFormat) -> anyhow::Result<()> {
    let script = Script::parse(script)?;
    let registry = CaseRegistry::new(config)?;
    let mut session = Session::new(registry, script.actors);
    let reports = session.run(script.steps);
    let validation = session.registry().validate_chain()?;

    match format {
        OutputFormat::Json => {
            let report = SessionReport {
                steps: &reports,
                validation: &validation,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for report in &reports {
                print_step(report);
            }
            println!();
            print_validation(&validation);
        }
    }

    let unexpected = reports.iter().filter(|r| !r.as_expected()).count();
    if unexpected > 0 {
        bail!("{unexpected} step(s) did not behave as scripted");
    }
    if !validation.is_valid() {
        bail!("ledger failed validation");
    }
    Ok(())
}

fn cmd_config(config: &RegistryConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", config.to_toml()?),
    }
    Ok(())
}

// ---- Text rendering ----

fn print_step(report: &StepReport) {
    let label = format!("[{}] {}", report.index, report.command);
    let by = report
        .actor
        .as_deref()
        .map(|a| format!(" by {}", a.cyan()))
        .unwrap_or_default();

    match (&report.outcome, &report.error) {
        (_, Some(error)) if report.expected_failure => {
            println!(
                "{} {}{} rejected as expected: {}",
                "✓".green(),
                label.bold(),
                by,
                error.yellow()
            );
        }
        (_, Some(error)) => {
            println!("{} {}{}: {}", "✗".red().bold(), label.bold(), by, error.red());
        }
        (Some(outcome), None) => {
            let mark = if report.expected_failure {
                "✗ unexpectedly succeeded".red().bold().to_string()
            } else {
                "✓".green().to_string()
            };
            println!("{} {}{}", mark, label.bold(), by);
            print_outcome(outcome);
        }
        (None, None) => println!("{} {}{}", "?".yellow(), label.bold(), by),
    }
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Appended { block } => print_block_line("  ", block),
        Outcome::Requested { request, case } => {
            println!("  request {} for {}", request.short_id().yellow(), case.short_hex().dimmed());
        }
        Outcome::Cases { overview } => print_overview(overview),
        Outcome::Inbox { requests } => print_inbox(requests),
        Outcome::Timeline { timeline } => print_timeline(timeline),
        Outcome::Validated { report } => {
            println!("  {} block(s), difficulty {}", report.block_count, report.difficulty);
        }
    }
}

fn print_block_line(indent: &str, block: &Block) {
    println!(
        "{indent}{} {} {} (nonce {})",
        block.timestamp.to_string().dimmed(),
        block.payload.block_type.bold(),
        block.hash.short_hex().yellow(),
        block.nonce
    );
}

fn print_overview(overview: &CaseOverview) {
    let visibility = &overview.visibility;
    if visibility.visible.is_empty() && visibility.other.is_empty() {
        println!("  no cases on the ledger");
    }
    for visible in &visibility.visible {
        let access = match visible.access {
            Access::Owned => "owned".green(),
            Access::Granted => "granted".blue(),
            Access::Judicial => "judicial".magenta(),
        };
        println!("  {:<9} {}", access, case_line(&visible.case));
    }
    for other in &visibility.other {
        let status = if other.request_pending {
            "pending".yellow()
        } else {
            "locked".dimmed()
        };
        println!("  {:<9} {}", status, case_line(&other.case));
    }
    println!(
        "  audit: {} evidence, {} grant(s), {} transfer(s); {} dangling reference(s) ignored",
        overview.evidence_blocks.len(),
        overview.grant_blocks.len(),
        overview.transfer_blocks.len(),
        overview.stats.dropped_dangling
    );
}

fn case_line(case: &CaseState) -> String {
    let grants: Vec<&str> = case.granted_departments.iter().map(String::as_str).collect();
    format!(
        "{} {} owner {}/{} evidence {} grants [{}]",
        display_or_dash(case.case_id()).bold(),
        case.fir_hash.short_hex().dimmed(),
        case.current_owner_department,
        case.current_owner_username,
        case.evidence.len(),
        grants.join(", ")
    )
}

fn print_inbox(requests: &[PendingRequest]) {
    if requests.is_empty() {
        println!("  inbox empty");
    }
    for request in requests {
        println!(
            "  {} {} ({}, {}) wants {} {}",
            request.id.short_id().yellow(),
            request.requester.username.cyan(),
            request.requester.role,
            request.requester.department,
            display_or_dash(&request.case_id).bold(),
            request.fir_hash.short_hex().dimmed()
        );
    }
}

fn print_timeline(timeline: &CaseTimeline) {
    for block in timeline.iter() {
        print_block_line("  ", block);
        let detail = ["description", "requester_dept", "new_dept", "case_id"]
            .iter()
            .find_map(|field| block.payload.field_str(field).map(|v| (field, v)));
        if let Some((field, value)) = detail {
            println!("      {field}: {value}");
        }
    }
}

fn print_validation(report: &ValidationReport) {
    if report.is_valid() {
        println!("{} Ledger integrity verified", "✓".green().bold());
    } else {
        println!("{} Ledger integrity violated", "✗".red().bold());
    }
    let flag = |ok: bool| if ok { "valid".green() } else { "broken".red() };
    println!("  Blocks: {}", report.block_count.to_string().bold());
    println!("  Hash chain: {}", flag(report.hash_chain_valid));
    println!("  Proof of work: {}", flag(report.proof_of_work_valid));
    println!("  Timestamps: {}", flag(report.timestamps_monotonic));
    for violation in &report.violations {
        println!(
            "  {} #{} {:?}: {}",
            "!".red(),
            violation.index,
            violation.kind,
            violation.description
        );
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
