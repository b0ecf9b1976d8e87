use super::parameterize::{self, AssignmentResult};
use crate::core::forcefield::ruleset::RuleSet;
use crate::core::models::molecule::{Molecule, MoleculeRecord};
use crate::engine::config::AssignmentConfig;
use crate::engine::diagnostics::BatchStatistics;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The result of one molecule of a batch. Molecules succeed or fail as a whole.
#[derive(Debug)]
pub struct MoleculeOutcome {
    /// Position of the molecule in the input.
    pub index: usize,
    pub name: String,
    pub result: Result<AssignmentResult, EngineError>,
}

impl MoleculeOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct BatchResult {
    /// One outcome per input molecule, in input order.
    pub outcomes: Vec<MoleculeOutcome>,
    pub statistics: BatchStatistics,
}

impl BatchResult {
    pub fn succeeded(&self) -> impl Iterator<Item = (&MoleculeOutcome, &AssignmentResult)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|r| (o, r)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&MoleculeOutcome, &EngineError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(MoleculeOutcome::is_success)
    }
}

/// Parameterizes serialized molecules, each in isolation.
///
/// A malformed graph, an unassignable site or a panic fails only the molecule it occurs in.
#[instrument(skip_all, name = "batch_workflow", fields(molecules = records.len()))]
pub fn run(
    records: &[MoleculeRecord],
    rules: &RuleSet,
    config: &AssignmentConfig,
    reporter: &ProgressReporter,
) -> BatchResult {
    run_each(records, |r| r.name.as_str(), rules, config, reporter, |record| {
        parameterize::run_record(record, rules, config, &ProgressReporter::new())
    })
}

/// Parameterizes already validated molecules, each in isolation.
#[instrument(skip_all, name = "batch_workflow", fields(molecules = molecules.len()))]
pub fn run_molecules(
    molecules: &[Molecule],
    rules: &RuleSet,
    config: &AssignmentConfig,
    reporter: &ProgressReporter,
) -> BatchResult {
    run_each(molecules, Molecule::name, rules, config, reporter, |molecule| {
        parameterize::run(molecule, rules, config, &ProgressReporter::new())
    })
}

fn run_each<T, N, F>(
    inputs: &[T],
    name_of: N,
    rules: &RuleSet,
    config: &AssignmentConfig,
    reporter: &ProgressReporter,
    assign: F,
) -> BatchResult
where
    T: Sync,
    N: Fn(&T) -> &str + Sync,
    F: Fn(&T) -> Result<AssignmentResult, EngineError> + Sync,
{
    info!(
        molecules = inputs.len(),
        rules = rules.len(),
        classes = config.class_order().len(),
        "Starting batch assignment."
    );
    reporter.report(Progress::PhaseStart { name: "batch" });
    reporter.report(Progress::TaskStart {
        total_steps: inputs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = inputs.iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = inputs.par_iter().enumerate();

    let outcomes: Vec<MoleculeOutcome> = iterator
        .map(|(index, input)| {
            let name = name_of(input).to_string();
            let result = panic::catch_unwind(AssertUnwindSafe(|| assign(input)))
                .unwrap_or_else(|payload| {
                    Err(EngineError::Panicked {
                        message: panic_message(payload.as_ref()),
                    })
                });
            if let Err(e) = &result {
                warn!(index, molecule = %name, error = %e, "Molecule failed.");
                if !reporter.is_silent() {
                    reporter.report(Progress::Message(format!("{name}: {e}")));
                }
            }
            reporter.report(Progress::MoleculeFinished {
                index,
                succeeded: result.is_ok(),
            });
            reporter.report(Progress::TaskIncrement);
            MoleculeOutcome {
                index,
                name,
                result,
            }
        })
        .collect();

    reporter.report(Progress::TaskFinish);

    let mut statistics = BatchStatistics::new();
    for outcome in &outcomes {
        if let Ok(result) = &outcome.result {
            statistics.record(&result.diagnostics);
        }
    }

    let batch = BatchResult {
        outcomes,
        statistics,
    };
    info!(
        succeeded = batch.success_count(),
        failed = batch.failure_count(),
        "Batch assignment finished."
    );
    reporter.report(Progress::PhaseFinish);
    batch
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
