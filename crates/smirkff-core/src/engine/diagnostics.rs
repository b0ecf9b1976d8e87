use crate::core::forcefield::class::InteractionClass;
use crate::core::forcefield::ruleset::RuleSet;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::warn;

/// How often one rule matched and won during a single assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuleUsage {
    pub rule_id: String,
    pub class: InteractionClass,
    /// Candidate sites the rule's pattern matched.
    pub matched: usize,
    /// Sites the rule still held after every later rule was applied.
    pub won: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnusedReason {
    /// The pattern matched no candidate site.
    NoMatch,
    /// Every site the pattern matched was taken by a later rule.
    Overridden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnusedRule {
    pub rule_id: String,
    pub class: InteractionClass,
    pub reason: UnusedReason,
}

/// Several rules of one class share the exact same SMIRKS text. Only the last one can ever win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DuplicatePattern {
    pub class: InteractionClass,
    pub smirks: String,
    /// Rule ids in declaration order.
    pub rule_ids: Vec<String>,
}

/// Non-fatal findings of one assignment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Diagnostics {
    pub usage: Vec<RuleUsage>,
    pub unused: Vec<UnusedRule>,
    pub duplicate_patterns: Vec<DuplicatePattern>,
}

impl Diagnostics {
    pub fn usage_of(&self, rule_id: &str) -> Option<&RuleUsage> {
        self.usage.iter().find(|u| u.rule_id == rule_id)
    }

    pub fn unused_reason(&self, rule_id: &str) -> Option<UnusedReason> {
        self.unused
            .iter()
            .find(|u| u.rule_id == rule_id)
            .map(|u| u.reason)
    }

    pub(crate) fn record_usage(&mut self, usage: RuleUsage) {
        if usage.won == 0 {
            let reason = if usage.matched == 0 {
                UnusedReason::NoMatch
            } else {
                UnusedReason::Overridden
            };
            self.unused.push(UnusedRule {
                rule_id: usage.rule_id.clone(),
                class: usage.class,
                reason,
            });
        }
        self.usage.push(usage);
    }

    pub(crate) fn warn_unused(&self) {
        for rule in &self.unused {
            warn!(
                rule_id = %rule.rule_id,
                class = %rule.class,
                reason = ?rule.reason,
                "Rule was not used for any site"
            );
        }
    }
}

/// Finds groups of rules that repeat a SMIRKS string within one class.
pub fn duplicate_patterns(rules: &RuleSet) -> Vec<DuplicatePattern> {
    let mut found = Vec::new();
    for class in rules.classes() {
        let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let mut first_seen = Vec::new();
        for rule in rules.rules(class) {
            let ids = groups.entry(rule.smirks()).or_default();
            if ids.is_empty() {
                first_seen.push(rule.smirks());
            }
            ids.push(rule.id().to_string());
        }
        for smirks in first_seen {
            if let Some(ids) = groups.remove(smirks) {
                if ids.len() > 1 {
                    warn!(
                        class = %class,
                        smirks,
                        rule_ids = ?ids,
                        "Duplicate pattern within class"
                    );
                    found.push(DuplicatePattern {
                        class,
                        smirks: smirks.to_string(),
                        rule_ids: ids,
                    });
                }
            }
        }
    }
    found
}

/// Usage totals of one rule across a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuleTally {
    pub class: InteractionClass,
    pub sites_won: usize,
    /// Molecules in which the rule won at least one site.
    pub molecules: usize,
}

/// Rule usage aggregated over every successfully parameterized molecule of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStatistics {
    rules: BTreeMap<String, RuleTally>,
}

impl BatchStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostics: &Diagnostics) {
        for usage in &diagnostics.usage {
            let tally = match self.rules.entry(usage.rule_id.clone()) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => e.insert(RuleTally {
                    class: usage.class,
                    sites_won: 0,
                    molecules: 0,
                }),
            };
            tally.sites_won += usage.won;
            if usage.won > 0 {
                tally.molecules += 1;
            }
        }
    }

    pub fn get(&self, rule_id: &str) -> Option<&RuleTally> {
        self.rules.get(rule_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleTally)> {
        self.rules.iter().map(|(id, t)| (id.as_str(), t))
    }

    /// Rules of `rules` that won no site in any molecule, in class and declaration order.
    pub fn never_used<'r>(&self, rules: &'r RuleSet) -> Vec<&'r str> {
        rules
            .iter()
            .filter(|r| self.rules.get(r.id()).is_none_or(|t| t.sites_won == 0))
            .map(|r| r.id())
            .collect()
    }
}
