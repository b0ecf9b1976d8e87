use crate::cli::AssignArgs;
use crate::config::PartialAssignConfig;
use crate::error::{CliError, Result};
use crate::io;
use crate::utils::progress::CliProgressHandler;
use smirkff::core::forcefield::ruleset::RuleSet;
use smirkff::engine::progress::ProgressReporter;
use smirkff::workflows::batch;
use tracing::{info, warn};

pub fn run(args: AssignArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialAssignConfig::from_file(path)?,
        None => PartialAssignConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    info!("Loading {} force-field file(s)...", config.forcefields.len());
    let rules = RuleSet::load_all(&config.forcefields)?;
    let molecules = io::read_molecules(&args.input)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Assigning {} rule(s) to {} molecule(s)...",
        rules.len(),
        molecules.len()
    );
    let result = batch::run(&molecules, &rules, &config.assignment, &reporter);

    let rendered = io::render_batch(&result)?;
    io::write_output(args.output.as_deref(), &rendered)?;
    if let Some(stats_path) = &args.stats {
        io::write_output(Some(stats_path), &io::render_statistics(&result)?)?;
    }

    if config.assignment.warn_unused_rules() {
        for rule_id in result.statistics.never_used(&rules) {
            warn!(rule_id, "Rule won no site in any molecule.");
        }
    }

    for (outcome, error) in result.failed() {
        eprintln!("✗ #{} '{}': {}", outcome.index, outcome.name, error);
    }
    eprintln!(
        "{} succeeded, {} failed.",
        result.success_count(),
        result.failure_count()
    );

    if result.all_succeeded() {
        Ok(())
    } else {
        Err(CliError::BatchFailures {
            failed: result.failure_count(),
            total: result.outcomes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const FORCE_FIELD: &str = r#"
[[bonds.parameters]]
id = "b-any"
smirks = "[*:1]~[*:2]"
length = 1.0
k = 500.0

[[bonds.parameters]]
id = "b-oh"
smirks = "[#8:1]-[#1:2]"
length = 0.96
k = 550.0

[[bonds.parameters]]
id = "b-cc"
smirks = "[#6:1]-[#6:2]"
length = 1.53
k = 620.0
"#;

    fn args(dir: &Path, molecules: &str) -> AssignArgs {
        let ff = dir.join("ff.toml");
        let input = dir.join("mols.toml");
        fs::write(&ff, FORCE_FIELD).unwrap();
        fs::write(&input, molecules).unwrap();
        let output = dir.join("out.toml");
        let stats = dir.join("stats.toml");
        let cli = Cli::try_parse_from([
            "smirkff",
            "assign",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-f",
            ff.to_str().unwrap(),
            "--stats",
            stats.to_str().unwrap(),
        ])
        .unwrap();
        match cli.command {
            Commands::Assign(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn assign_writes_topology_and_statistics() {
        let dir = tempdir().unwrap();
        let args = args(
            dir.path(),
            r#"
[[molecules]]
name = "water"
atoms = [{ element = "H" }, { element = "O" }, { element = "H" }]
bonds = [{ atoms = [0, 1] }, { atoms = [1, 2] }]
"#,
        );
        run(args).unwrap();

        let output = fs::read_to_string(dir.path().join("out.toml")).unwrap();
        assert!(output.contains("molecule = \"water\""));
        assert!(output.contains("rule-id = \"b-oh\""));
        assert!(!output.contains("[[failures]]"));

        let stats = fs::read_to_string(dir.path().join("stats.toml")).unwrap();
        assert!(stats.contains("[b-oh]"));
        assert!(stats.contains("sites-won = 2"));
    }

    #[test]
    fn assign_fails_when_any_molecule_fails() {
        let dir = tempdir().unwrap();
        let args = args(
            dir.path(),
            r#"
[[molecules]]
name = "water"
atoms = [{ element = "H" }, { element = "O" }, { element = "H" }]
bonds = [{ atoms = [0, 1] }, { atoms = [1, 2] }]

[[molecules]]
name = "broken"
atoms = [{ element = "C" }]
bonds = [{ atoms = [0, 0] }]
"#,
        );
        let result = run(args);
        assert!(matches!(
            result,
            Err(CliError::BatchFailures {
                failed: 1,
                total: 2
            })
        ));

        let output = fs::read_to_string(dir.path().join("out.toml")).unwrap();
        assert!(output.contains("molecule = \"water\""));
        assert!(output.contains("[[failures]]"));
        assert!(output.contains("molecule = \"broken\""));
    }
}
