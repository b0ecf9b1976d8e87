use super::class::InteractionClass;
use super::params::ParameterValues;
use super::ruleset::RuleSetError;
use crate::core::smirks::{Pattern, Replacements, parse_smirks_with};

/// A compiled force-field rule: a SMIRKS pattern and the parameters it assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    id: String,
    parent_id: Option<String>,
    class: InteractionClass,
    pattern: Pattern,
    params: ParameterValues,
    index: usize,
}

impl Rule {
    /// Compiles and validates a rule with no named replacements available.
    pub fn new(
        id: impl Into<String>,
        class: InteractionClass,
        smirks: &str,
        params: ParameterValues,
    ) -> Result<Self, RuleSetError> {
        Self::with_replacements(id, class, smirks, params, &Replacements::new())
    }

    /// Compiles and validates a rule.
    ///
    /// The pattern must have exactly as many tagged atoms as the class arity, the parameter
    /// variant must belong to `class`, and torsion rules must carry at least one term.
    pub fn with_replacements(
        id: impl Into<String>,
        class: InteractionClass,
        smirks: &str,
        params: ParameterValues,
        replacements: &Replacements,
    ) -> Result<Self, RuleSetError> {
        let id = id.into();

        let pattern =
            parse_smirks_with(smirks, replacements).map_err(|source| RuleSetError::Pattern {
                rule_id: id.clone(),
                source,
            })?;

        if pattern.tag_count() != class.arity() {
            return Err(RuleSetError::ArityMismatch {
                rule_id: id,
                class,
                expected: class.arity(),
                found: pattern.tag_count(),
            });
        }
        check_params(&id, class, &params)?;

        Ok(Self {
            id,
            parent_id: None,
            class,
            pattern,
            params,
            index: 0,
        })
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn class(&self) -> InteractionClass {
        self.class
    }

    pub fn smirks(&self) -> &str {
        self.pattern.smirks()
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn params(&self) -> &ParameterValues {
        &self.params
    }

    /// Position of the rule within its class, assigned when it is added to a rule set.
    pub fn declaration_index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_declaration_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Replaces the parameters, keeping pattern and declaration position.
    pub(crate) fn set_params(&mut self, params: ParameterValues) -> Result<(), RuleSetError> {
        check_params(&self.id, self.class, &params)?;
        self.params = params;
        Ok(())
    }
}

fn check_params(
    id: &str,
    class: InteractionClass,
    params: &ParameterValues,
) -> Result<(), RuleSetError> {
    if params.class() != class {
        return Err(RuleSetError::ParameterMismatch {
            rule_id: id.to_string(),
            class,
            found: params.class(),
        });
    }
    if params.torsion_terms().is_some_and(<[_]>::is_empty) {
        return Err(RuleSetError::EmptyTorsionTerms {
            rule_id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::TorsionTerm;
    use crate::core::smirks::SmirksError;

    fn bond_params() -> ParameterValues {
        ParameterValues::Bond {
            length: 1.09,
            k: 680.0,
        }
    }

    #[test]
    fn new_compiles_valid_rule() {
        let rule = Rule::new("b1", InteractionClass::Bond, "[#6:1]-[#1:2]", bond_params())
            .unwrap()
            .with_parent("b0");
        assert_eq!(rule.id(), "b1");
        assert_eq!(rule.parent_id(), Some("b0"));
        assert_eq!(rule.smirks(), "[#6:1]-[#1:2]");
        assert_eq!(rule.pattern().tag_count(), 2);
        assert_eq!(rule.class(), InteractionClass::Bond);
    }

    #[test]
    fn new_rejects_wrong_tag_count() {
        let err = Rule::new("b1", InteractionClass::Bond, "[#6:1]-[#1:2]-[*:3]", bond_params())
            .unwrap_err();
        assert!(matches!(
            err,
            RuleSetError::ArityMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn new_rejects_parameters_of_another_class() {
        let err = Rule::new(
            "a1",
            InteractionClass::Angle,
            "[*:1]~[*:2]~[*:3]",
            bond_params(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RuleSetError::ParameterMismatch {
                class: InteractionClass::Angle,
                found: InteractionClass::Bond,
                ..
            }
        ));
    }

    #[test]
    fn new_rejects_torsion_without_terms() {
        let err = Rule::new(
            "t1",
            InteractionClass::ProperTorsion,
            "[*:1]~[*:2]~[*:3]~[*:4]",
            ParameterValues::ProperTorsion { terms: vec![] },
        )
        .unwrap_err();
        assert!(matches!(err, RuleSetError::EmptyTorsionTerms { .. }));

        let ok = Rule::new(
            "t2",
            InteractionClass::ProperTorsion,
            "[*:1]~[*:2]~[*:3]~[*:4]",
            ParameterValues::ProperTorsion {
                terms: vec![TorsionTerm::new(3, 0.0, 0.15)],
            },
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn pattern_errors_carry_rule_id() {
        let err = Rule::new("bad", InteractionClass::Bond, "[#6:1]-[#6:1]", bond_params())
            .unwrap_err();
        match err {
            RuleSetError::Pattern { rule_id, source } => {
                assert_eq!(rule_id, "bad");
                assert_eq!(source, SmirksError::DuplicateTag { tag: 1 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
