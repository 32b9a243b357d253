//! Check command implementation.
//!
//! Analyzes the configured entrypoints and prints the report.

use crate::cli::Cli;
use crate::commands::utils;
use crate::config::{CyclesConfig, OutputFormat};
use crate::error::{CliError, Result};
use crate::ui;
use esm_cycles::{HostOptions, Issue, LintResult, ModuleHost, into_lint_results};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

/// Lint results of one run, plus the number of import cycles left out of
/// them because warnings were not requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub results: Vec<LintResult>,
    pub hidden_cycles: usize,
}

/// Counts of the reported issues, by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    pub errors: usize,
    pub warnings: usize,
}

impl CheckOutcome {
    fn from_results(results: &[LintResult]) -> Self {
        results.iter().fold(Self::default(), |outcome, result| Self {
            errors: outcome.errors + result.error_count,
            warnings: outcome.warnings + result.warning_count,
        })
    }

    /// Failure when any error is reported. Warnings alone never fail a run.
    pub fn exit_code(&self) -> ExitCode {
        if self.errors > 0 {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Execute the check.
///
/// # Steps
///
/// 1. Load configuration (defaults, config file, environment, CLI)
/// 2. Resolve the entrypoints
/// 3. Analyze them in one module host
/// 4. Print the report in the configured format
///
/// # Errors
///
/// Returns errors for invalid configuration, missing entrypoints, and
/// entrypoints that cannot be read.
pub fn execute(cli: &Cli) -> Result<CheckOutcome> {
    let cwd = utils::get_cwd()?;
    let config = CyclesConfig::load(cli, &cwd)?;

    let report = analyze(&config, &cwd)?;
    let outcome = CheckOutcome::from_results(&report.results);

    match render(&report.results, config.format)? {
        Some(rendered) => print!("{rendered}"),
        None => ui::success("No problems found"),
    }
    if report.hidden_cycles > 0 {
        ui::warning(&format!(
            "{} import {} hidden, pass --warnings to show {}",
            report.hidden_cycles,
            if report.hidden_cycles == 1 { "cycle" } else { "cycles" },
            if report.hidden_cycles == 1 { "it" } else { "them" },
        ));
    }
    Ok(outcome)
}

/// Run the analysis and group the reported issues per file.
///
/// Import cycles are dropped unless `config.warnings` is set.
pub fn analyze(config: &CyclesConfig, cwd: &Path) -> Result<Report> {
    if config.entrypoints.is_empty() {
        return Err(CliError::NoEntrypoints);
    }

    let entrypoints = config
        .entrypoints
        .iter()
        .map(|entry| utils::resolve_entrypoint(entry, cwd, &config.extensions))
        .collect::<Result<Vec<_>>>()?;

    let working_directory = working_directory(&entrypoints, cwd);
    debug!(
        working_directory = %working_directory.display(),
        extensions = ?config.extensions,
        "starting analysis"
    );

    let mut host = ModuleHost::new(HostOptions {
        extensions: config.extensions.clone(),
        working_directory,
    });
    for entry in &entrypoints {
        info!(entrypoint = %entry.display(), "analyzing entrypoint");
        host.parse_entrypoint(entry)?;
    }

    let (issues, hidden): (Vec<Issue>, Vec<Issue>) = host
        .issues()
        .into_iter()
        .partition(|issue| config.warnings || !issue.is_cycle());
    debug!(
        modules = host.file_names().len(),
        issues = issues.len(),
        hidden_cycles = hidden.len(),
        "analysis complete"
    );

    Ok(Report {
        results: into_lint_results(&issues),
        hidden_cycles: hidden.len(),
    })
}

/// Render the report, or `None` when a stylish report would be empty.
pub fn render(results: &[LintResult], format: OutputFormat) -> Result<Option<String>> {
    match format {
        OutputFormat::Json => Ok(Some(format!("{}\n", serde_json::to_string_pretty(results)?))),
        OutputFormat::Stylish if results.is_empty() => Ok(None),
        OutputFormat::Stylish => Ok(Some(ui::format_stylish(results))),
    }
}

/// The package root above the first entrypoint, else `cwd`.
fn working_directory(entrypoints: &[PathBuf], cwd: &Path) -> PathBuf {
    entrypoints
        .first()
        .and_then(|entry| entry.parent())
        .and_then(utils::find_package_root)
        .unwrap_or_else(|| cwd.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{}").unwrap();
        for (name, contents) in files {
            let path = temp.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        temp
    }

    fn config(entrypoints: &[&str], warnings: bool) -> CyclesConfig {
        CyclesConfig {
            entrypoints: entrypoints.iter().map(|entry| entry.to_string()).collect(),
            warnings,
            ..CyclesConfig::default()
        }
    }

    const CYCLE: &[(&str, &str)] = &[
        ("src/a.js", "import { b } from './b';\nexport const a = 1;\n"),
        ("src/b.js", "import { a } from './a';\nconsole.log(a);\nexport const b = 2;\n"),
    ];

    #[test]
    fn test_no_entrypoints() {
        let temp = project(&[]);
        let err = analyze(&config(&[], false), temp.path()).unwrap_err();
        assert!(matches!(err, CliError::NoEntrypoints));
    }

    #[test]
    fn test_cycles_need_warnings() {
        let temp = project(CYCLE);

        let report = analyze(&config(&["src/a"], false), temp.path()).unwrap();
        assert_eq!(report.hidden_cycles, 1);
        let rules: Vec<&str> = report
            .results
            .iter()
            .flat_map(|result| &result.messages)
            .map(|message| message.rule_id.as_str())
            .collect();
        assert_eq!(rules, ["use-before-execution"]);

        let report = analyze(&config(&["src/a"], true), temp.path()).unwrap();
        assert_eq!(report.hidden_cycles, 0);
        let outcome = CheckOutcome::from_results(&report.results);
        assert_eq!(outcome, CheckOutcome { errors: 1, warnings: 1 });
        assert_eq!(outcome.exit_code(), ExitCode::FAILURE);
    }

    #[test]
    fn test_working_directory_is_package_root() {
        let temp = project(&[("src/deep/entry.js", "")]);
        let entry = temp.path().join("src/deep/entry.js");
        assert_eq!(working_directory(&[entry], Path::new("/elsewhere")), temp.path());
        assert_eq!(working_directory(&[], Path::new("/elsewhere")), Path::new("/elsewhere"));
    }

    #[test]
    fn test_render() {
        let temp = project(CYCLE);
        assert_eq!(render(&[], OutputFormat::Stylish).unwrap(), None);
        assert_eq!(render(&[], OutputFormat::Json).unwrap().as_deref(), Some("[]\n"));

        let report = analyze(&config(&["src/a.js"], false), temp.path()).unwrap();
        let json = render(&report.results, OutputFormat::Json).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let message = &value[0]["messages"][0];
        assert_eq!(message["ruleId"], "use-before-execution");
        assert_eq!(message["severity"], 2);
        assert_eq!(value[0]["errorCount"], 1);
        assert!(value[0]["filePath"].as_str().unwrap().ends_with("b.js"));
    }
}
