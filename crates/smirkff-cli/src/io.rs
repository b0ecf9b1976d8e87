use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use smirkff::core::models::molecule::MoleculeRecord;
use smirkff::core::models::parameterized::ParameterizedTopology;
use smirkff::engine::diagnostics::RuleTally;
use smirkff::workflows::batch::BatchResult;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// A molecules input file: a `[[molecules]]` array of tables.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct MoleculesFile {
    #[serde(default)]
    pub molecules: Vec<MoleculeRecord>,
}

pub fn read_molecules(path: &Path) -> Result<Vec<MoleculeRecord>> {
    debug!("Reading molecules from {:?}", path);
    let content = std::fs::read_to_string(path)?;
    let file: MoleculesFile = toml::from_str(&content).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(count = file.molecules.len(), "Molecules loaded.");
    Ok(file.molecules)
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct FailureRecord<'a> {
    index: usize,
    molecule: &'a str,
    error: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct TopologyDocument<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    topologies: Vec<&'a ParameterizedTopology>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<FailureRecord<'a>>,
}

/// Renders the successful topologies and the failures of a batch as TOML.
pub fn render_batch(batch: &BatchResult) -> Result<String> {
    let document = TopologyDocument {
        topologies: batch.succeeded().map(|(_, r)| &r.topology).collect(),
        failures: batch
            .failed()
            .map(|(outcome, error)| FailureRecord {
                index: outcome.index,
                molecule: &outcome.name,
                error: error.to_string(),
            })
            .collect(),
    };
    toml::to_string(&document).map_err(|e| CliError::Other(e.into()))
}

/// Renders per-rule batch statistics as TOML, keyed by rule id.
pub fn render_statistics(batch: &BatchResult) -> Result<String> {
    let rules: BTreeMap<&str, &RuleTally> = batch.statistics.iter().collect();
    toml::to_string(&rules).map_err(|e| CliError::Other(e.into()))
}

pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)?;
            info!("Output written to {:?}", path);
        }
        None => print!("{content}"),
    }
    Ok(())
}
