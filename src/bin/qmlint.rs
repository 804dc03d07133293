#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use qmlint::cli::args::CliArgs;
use qmlint::cli::driver::{self, EXIT_FAILURE};
use qmlint::cli::json;
use qmlint::cli::reporter::Reporter;
use qmlint_checker::PassRegistry;
use std::io::{IsTerminal, Write};
use std::path::Path;

fn main() -> Result<()> {
    // QMLINT_LOG / QMLINT_LOG_FORMAT, see src/tracing_config.rs
    qmlint::tracing_config::init_tracing();

    let args = CliArgs::parse();

    if args.list_categories {
        print!("{}", driver::category_listing(&PassRegistry::builtin()));
        return Ok(());
    }

    if args.files.is_empty() && args.module.is_none() {
        eprintln!("qmlint: no input files (see --help)");
        std::process::exit(EXIT_FAILURE);
    }

    let outcome = match driver::run(&args) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("qmlint: {err:#}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    for name in &outcome.unknown_categories {
        eprintln!("qmlint: unknown category \"{name}\"");
    }

    let json_to_stdout = args.json.as_deref() == Some(Path::new("-"));
    if let Some(target) = &args.json {
        let text = json::to_json_string(&outcome.reports).context("failed to serialize JSON report")?;
        if json_to_stdout {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("failed to write JSON report")?;
        } else {
            std::fs::write(target, text + "\n")
                .with_context(|| format!("failed to write {}", target.display()))?;
        }
    }

    if !json_to_stdout {
        let color = !args.no_color && std::io::stdout().is_terminal();
        let reporter = Reporter::new(color);
        let mut stdout = std::io::stdout().lock();
        for report in outcome.reports.iter().filter(|r| !r.diagnostics.is_empty()) {
            writeln!(stdout, "{}\n", reporter.render(report)).context("failed to write report")?;
        }
        let summary = reporter.summary(outcome.error_count(), outcome.warning_count());
        if !summary.is_empty() {
            writeln!(stdout, "{summary}").context("failed to write report")?;
        }
        if outcome.fixes_applied > 0 {
            writeln!(stdout, "Applied {} fix(es).", outcome.fixes_applied).context("failed to write report")?;
        }
    }

    let code = outcome.exit_code(args.max_warnings);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
