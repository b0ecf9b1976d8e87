use super::config::AssignmentConfig;
use super::diagnostics::{Diagnostics, RuleUsage, duplicate_patterns};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::forcefield::class::InteractionClass;
use crate::core::forcefield::params::ParameterValues;
use crate::core::forcefield::rule::Rule;
use crate::core::forcefield::ruleset::RuleSet;
use crate::core::models::molecule::Molecule;
use crate::core::models::parameterized::{AssignedTerm, ClassTerms, ParameterizedTopology};
use crate::core::smirks::Matcher;
use crate::core::topology::sites::{self, Site};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Applies a rule set to molecules, one interaction class at a time.
///
/// Within a class the rule declared last wins every site it matches. Required classes must
/// cover every candidate site; optional classes simply leave unmatched sites out.
pub struct Resolver<'a> {
    rules: &'a RuleSet,
    config: &'a AssignmentConfig,
    reporter: &'a ProgressReporter<'a>,
}

struct ClassOutcome {
    terms: ClassTerms,
    usage: Vec<RuleUsage>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        rules: &'a RuleSet,
        config: &'a AssignmentConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            rules,
            config,
            reporter,
        }
    }

    #[instrument(skip_all, name = "resolver", fields(molecule = %molecule.name()))]
    pub fn resolve(
        &self,
        molecule: &Molecule,
    ) -> Result<(ParameterizedTopology, Diagnostics), EngineError> {
        let mut topology = ParameterizedTopology::new(molecule.name());
        let mut diagnostics = Diagnostics {
            duplicate_patterns: duplicate_patterns(self.rules),
            ..Diagnostics::default()
        };

        for &class in self.config.class_order() {
            let rules = self.rules.rules(class);
            if rules.is_empty() {
                debug!(class = %class, "No rules declared; class skipped.");
                continue;
            }

            self.reporter.report(Progress::PhaseStart {
                name: class.section_name(),
            });
            let outcome = self.resolve_class(class, rules, molecule)?;
            self.reporter.report(Progress::PhaseFinish);

            for usage in outcome.usage {
                diagnostics.record_usage(usage);
            }
            topology.push_class(outcome.terms);
        }

        if self.config.warn_unused_rules() {
            diagnostics.warn_unused();
        }
        info!(
            terms = topology.term_count(),
            unused_rules = diagnostics.unused.len(),
            "Assignment finished."
        );
        Ok((topology, diagnostics))
    }

    /// Every match of every rule, indexed like `rules`. Each rule's matches come out in the
    /// matcher's own order whether or not the rules run in parallel.
    fn match_rules(
        &self,
        class: InteractionClass,
        rules: &[Rule],
        molecule: &Molecule,
    ) -> Vec<Vec<Vec<usize>>> {
        let match_one = |rule: &Rule| -> Vec<Vec<usize>> {
            let found = Matcher::new(rule.pattern(), molecule)
                .symmetry(class.symmetry())
                .matches()
                .collect();
            self.reporter.report(Progress::TaskIncrement);
            found
        };

        #[cfg(feature = "parallel")]
        if self.config.parallel() {
            return rules.par_iter().map(&match_one).collect();
        }

        rules.iter().map(&match_one).collect()
    }

    fn resolve_class(
        &self,
        class: InteractionClass,
        rules: &[Rule],
        molecule: &Molecule,
    ) -> Result<ClassOutcome, EngineError> {
        let candidates: BTreeSet<Site> = sites::enumerate(class, molecule).into_iter().collect();
        debug!(
            class = %class,
            candidates = candidates.len(),
            rules = rules.len(),
            "Matching class rules."
        );

        self.reporter.report(Progress::TaskStart {
            total_steps: rules.len() as u64,
        });
        let per_rule = self.match_rules(class, rules, molecule);
        self.reporter.report(Progress::TaskFinish);

        let mut winners: BTreeMap<Site, (usize, Vec<usize>)> = BTreeMap::new();
        let mut matched = vec![0usize; rules.len()];
        for (rule_idx, found) in per_rule.into_iter().enumerate() {
            for atoms in found {
                let site = Site::canonical(class, &atoms);
                if !candidates.contains(&site) {
                    trace!(
                        rule_id = rules[rule_idx].id(),
                        site = %site,
                        "Match is not a candidate site."
                    );
                    continue;
                }
                matched[rule_idx] += 1;
                winners.insert(site, (rule_idx, atoms));
            }
        }

        let unassigned = candidates.len() - winners.len();
        if unassigned > 0 {
            if class.is_required() {
                let first = candidates
                    .iter()
                    .find(|site| !winners.contains_key(*site))
                    .map(|site| site.atoms().to_vec())
                    .unwrap_or_default();
                return Err(EngineError::UnassignableSite {
                    class,
                    atoms: first,
                    unassigned,
                });
            }
            debug!(class = %class, unassigned, "Optional class left sites unassigned.");
        }

        let mut won = vec![0usize; rules.len()];
        let mut terms = ClassTerms::new(class, self.rules.potential(class).map(str::to_string))
            .with_attributes(self.rules.attributes(class).cloned().unwrap_or_default());
        for (site, (rule_idx, atoms)) in winners {
            let rule = &rules[rule_idx];
            won[rule_idx] += 1;
            let params = site_params(rule, &atoms, molecule);
            terms.insert(AssignedTerm {
                site,
                atoms,
                rule_id: rule.id().to_string(),
                smirks: rule.smirks().to_string(),
                params,
            });
        }

        let usage = rules
            .iter()
            .zip(matched.into_iter().zip(won))
            .map(|(rule, (matched, won))| RuleUsage {
                rule_id: rule.id().to_string(),
                class,
                matched,
                won,
            })
            .collect();

        Ok(ClassOutcome { terms, usage })
    }
}

/// Parameters of `rule` at one matched site, with bond-order-dependent values resolved
/// against the matched bond.
fn site_params(rule: &Rule, atoms: &[usize], molecule: &Molecule) -> ParameterValues {
    let params = rule.params();
    let &[a, b] = atoms else {
        return params.clone();
    };
    if !params.is_bond_order_dependent() {
        return params.clone();
    }
    match molecule.bond_between(a, b) {
        Some(bond) => {
            let order = bond.effective_order();
            trace!(rule_id = rule.id(), a, b, order, "Interpolating bond parameters.");
            params.at_bond_order(order)
        }
        None => params.clone(),
    }
}
