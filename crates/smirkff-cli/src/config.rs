use crate::cli::AssignArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use smirkff::core::forcefield::class::InteractionClass;
use smirkff::engine::config::AssignmentConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings read from the optional `--config` file. Every key may be overridden on the
/// command line.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialAssignConfig {
    forcefields: Option<Vec<PathBuf>>,
    class_order: Option<Vec<String>>,
    warn_unused_rules: Option<bool>,
}

/// Fully resolved settings of an `assign` run.
#[derive(Debug)]
pub struct AppConfig {
    pub forcefields: Vec<PathBuf>,
    pub assignment: AssignmentConfig,
}

impl PartialAssignConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        // Force-field paths in the file are relative to the file itself.
        if let (Some(files), Some(base)) = (config.forcefields.as_mut(), path.parent()) {
            for file in files.iter_mut().filter(|f| f.is_relative()) {
                *file = base.join(&*file);
            }
        }
        Ok(config)
    }

    pub fn merge_with_cli(self, args: &AssignArgs) -> Result<AppConfig> {
        let forcefields = if args.forcefields.is_empty() {
            self.forcefields.unwrap_or_default()
        } else {
            args.forcefields.clone()
        };
        if forcefields.is_empty() {
            return Err(CliError::Config(
                "At least one force-field file is required (`--forcefield` or `forcefields`)."
                    .to_string(),
            ));
        }

        let mut builder = AssignmentConfig::builder()
            .warn_unused_rules(args.warn_unused || self.warn_unused_rules.unwrap_or(false));
        if let Some(names) = args.classes.as_ref().or(self.class_order.as_ref()) {
            builder = builder.class_order(parse_classes(names)?);
        }

        let assignment = builder.build().map_err(|e| CliError::Config(e.to_string()))?;
        Ok(AppConfig {
            forcefields,
            assignment,
        })
    }
}

fn parse_classes(names: &[String]) -> Result<Vec<InteractionClass>> {
    names
        .iter()
        .map(|n| {
            n.trim()
                .parse::<InteractionClass>()
                .map_err(|e| CliError::Argument(e.to_string()))
        })
        .collect()
}
