use super::class::InteractionClass;
use super::params::ParameterValues;
use super::rule::Rule;
use crate::core::smirks::{Replacements, SmirksError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Rule '{rule_id}' has an invalid SMIRKS pattern: {source}")]
    Pattern {
        rule_id: String,
        source: SmirksError,
    },
    #[error("Rule '{rule_id}' tags {found} atoms, but {class} rules need exactly {expected}")]
    ArityMismatch {
        rule_id: String,
        class: InteractionClass,
        expected: usize,
        found: usize,
    },
    #[error("Rule '{rule_id}' in {class} carries {found} parameters")]
    ParameterMismatch {
        rule_id: String,
        class: InteractionClass,
        found: InteractionClass,
    },
    #[error("Rule id '{rule_id}' is declared more than once")]
    DuplicateId { rule_id: String },
    #[error("Torsion rule '{rule_id}' has no terms")]
    EmptyTorsionTerms { rule_id: String },
    #[error("Rule '{rule_id}' is missing required field '{field}'")]
    MissingField {
        rule_id: String,
        field: &'static str,
    },
    #[error("Rule '{rule_id}' has field '{field}', which does not apply to {class}")]
    UnexpectedField {
        rule_id: String,
        class: InteractionClass,
        field: &'static str,
    },
    #[error("No rule with id '{rule_id}'")]
    UnknownRule { rule_id: String },
    #[error("Failed to serialize rule set: {source}")]
    Serialize {
        #[from]
        source: toml::ser::Error,
    },
}

/// Section-level settings of a class that apply to all of its rules, such as `cutoff` or
/// `scale14` for van der Waals terms. They are carried through to the output untouched.
pub type SectionAttributes = BTreeMap<String, toml::Value>;

/// Descriptive header of a force field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ForceFieldMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct ClassRules {
    potential: Option<String>,
    attributes: SectionAttributes,
    rules: Vec<Rule>,
}

/// An ordered collection of rules, grouped by interaction class.
///
/// Within a class, rules keep the order in which they were pushed. That order is the only
/// thing that decides which rule wins a site, so rules can be appended and their parameters
/// edited in place, but never removed or reordered.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    meta: ForceFieldMeta,
    replacements: Replacements,
    classes: BTreeMap<InteractionClass, ClassRules>,
    ids: HashMap<String, (InteractionClass, usize)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meta(&self) -> &ForceFieldMeta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: ForceFieldMeta) {
        self.meta = meta;
    }

    /// Named SMIRKS fragments available to patterns of this set.
    pub fn replacements(&self) -> &Replacements {
        &self.replacements
    }

    pub fn add_replacement(&mut self, name: impl Into<String>, smirks: impl Into<String>) {
        let name = name.into();
        let smirks = smirks.into();
        if let Some(previous) = self.replacements.insert(name.clone(), smirks.clone()) {
            if previous != smirks {
                warn!(
                    name = %name,
                    "Replacement redefined; the later definition applies to later rules"
                );
            }
        }
    }

    /// Appends a rule to the end of its class.
    pub fn push(&mut self, mut rule: Rule) -> Result<(), RuleSetError> {
        if self.ids.contains_key(rule.id()) {
            return Err(RuleSetError::DuplicateId {
                rule_id: rule.id().to_string(),
            });
        }
        let class = rule.class();
        let entry = self.classes.entry(class).or_default();
        let index = entry.rules.len();
        rule.set_declaration_index(index);
        self.ids.insert(rule.id().to_string(), (class, index));
        entry.rules.push(rule);
        Ok(())
    }

    /// Rules of `class` in declaration order.
    pub fn rules(&self, class: InteractionClass) -> &[Rule] {
        self.classes
            .get(&class)
            .map(|c| c.rules.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        let &(class, index) = self.ids.get(id)?;
        self.rules(class).get(index)
    }

    /// Replaces the parameters of rule `id`. The rule keeps its pattern and its position.
    pub fn set_parameters(
        &mut self,
        id: &str,
        params: ParameterValues,
    ) -> Result<(), RuleSetError> {
        let &(class, index) = self.ids.get(id).ok_or_else(|| RuleSetError::UnknownRule {
            rule_id: id.to_string(),
        })?;
        let rule = self
            .classes
            .get_mut(&class)
            .and_then(|c| c.rules.get_mut(index))
            .ok_or_else(|| RuleSetError::UnknownRule {
                rule_id: id.to_string(),
            })?;
        rule.set_params(params)?;
        debug!(rule_id = id, class = %class, "Rule parameters replaced");
        Ok(())
    }

    /// First rule of `class` whose pattern text equals `smirks`.
    pub fn find_by_smirks(&self, class: InteractionClass, smirks: &str) -> Option<&Rule> {
        self.rules(class).iter().find(|r| r.smirks() == smirks)
    }

    pub fn contains_smirks(&self, class: InteractionClass, smirks: &str) -> bool {
        self.find_by_smirks(class, smirks).is_some()
    }

    /// Total number of rules across all classes.
    pub fn len(&self) -> usize {
        self.classes.values().map(|c| c.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Classes that declare at least one rule, in default processing order.
    pub fn classes(&self) -> impl Iterator<Item = InteractionClass> + '_ {
        self.classes
            .iter()
            .filter(|(_, c)| !c.rules.is_empty())
            .map(|(&class, _)| class)
    }

    /// Every rule, class by class in default processing order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.classes.values().flat_map(|c| c.rules.iter())
    }

    /// Functional form declared for a class, if any.
    pub fn potential(&self, class: InteractionClass) -> Option<&str> {
        self.classes.get(&class)?.potential.as_deref()
    }

    pub fn set_potential(&mut self, class: InteractionClass, potential: impl Into<String>) {
        let potential = potential.into();
        let entry = self.classes.entry(class).or_default();
        if let Some(previous) = entry.potential.as_deref() {
            if previous != potential {
                warn!(
                    class = %class,
                    previous = %previous,
                    potential = %potential,
                    "Potential redefined for class; keeping the later declaration"
                );
            }
        }
        entry.potential = Some(potential);
    }

    /// Section-level settings declared for a class, if any.
    pub fn attributes(&self, class: InteractionClass) -> Option<&SectionAttributes> {
        self.classes
            .get(&class)
            .map(|c| &c.attributes)
            .filter(|a| !a.is_empty())
    }

    pub fn attribute(&self, class: InteractionClass, name: &str) -> Option<&toml::Value> {
        self.classes.get(&class)?.attributes.get(name)
    }

    pub fn set_attribute(
        &mut self,
        class: InteractionClass,
        name: impl Into<String>,
        value: toml::Value,
    ) {
        let name = name.into();
        let entry = self.classes.entry(class).or_default();
        if let Some(previous) = entry.attributes.get(&name) {
            if previous != &value {
                warn!(
                    class = %class,
                    attribute = %name,
                    previous = %previous,
                    value = %value,
                    "Section attribute redefined; keeping the later declaration"
                );
            }
        }
        entry.attributes.insert(name, value);
    }

    /// Appends every rule of `other` after the rules already present, class by class.
    ///
    /// Replacements, potentials and section attributes declared by `other` take precedence.
    /// The metadata of `self` is kept unless it is empty. Nothing is merged when a rule id of
    /// `other` is already taken.
    pub fn extend(&mut self, other: RuleSet) -> Result<(), RuleSetError> {
        if let Some(rule) = other.iter().find(|r| self.ids.contains_key(r.id())) {
            return Err(RuleSetError::DuplicateId {
                rule_id: rule.id().to_string(),
            });
        }
        if self.meta == ForceFieldMeta::default() {
            self.meta = other.meta;
        }
        for (name, smirks) in other.replacements {
            self.add_replacement(name, smirks);
        }
        for (class, section) in other.classes {
            if let Some(potential) = section.potential {
                self.set_potential(class, potential);
            }
            for (name, value) in section.attributes {
                self.set_attribute(class, name, value);
            }
            for rule in section.rules {
                self.push(rule)?;
            }
        }
        Ok(())
    }
}
