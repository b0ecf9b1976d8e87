use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use smirkff::core::forcefield::ruleset::RuleSet;
use smirkff::engine::diagnostics::duplicate_patterns;
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let rules = RuleSet::load_all(&args.forcefields)?;
    info!(rules = rules.len(), "Force field loaded and validated.");

    print!("{}", summarize(&rules));

    let duplicates = duplicate_patterns(&rules);
    for duplicate in &duplicates {
        println!(
            "! duplicate pattern in {}: {} (rules {})",
            duplicate.class,
            duplicate.smirks,
            duplicate.rule_ids.join(", ")
        );
    }

    if args.strict && !duplicates.is_empty() {
        return Err(CliError::DuplicatePatterns(duplicates.len()));
    }
    Ok(())
}

fn summarize(rules: &RuleSet) -> String {
    let meta = rules.meta();
    let mut out = format!(
        "{} {}\n",
        meta.name.as_deref().unwrap_or("(unnamed force field)"),
        meta.version.as_deref().unwrap_or("")
    )
    .replace(" \n", "\n");
    for class in rules.classes() {
        let potential = rules
            .potential(class)
            .map(|p| format!(" [{p}]"))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<24} {:>5} rule(s){}\n",
            class.section_name(),
            rules.rules(class).len(),
            potential
        ));
    }
    if !rules.replacements().is_empty() {
        out.push_str(&format!(
            "  {:<24} {:>5}\n",
            "replacements",
            rules.replacements().len()
        ));
    }
    out
}
