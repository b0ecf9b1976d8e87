use crate::core::forcefield::class::InteractionClass;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Class processing order is empty")]
    EmptyClassOrder,
    #[error("Class '{0}' appears more than once in the processing order")]
    DuplicateClass(InteractionClass),
}

/// Settings of one assignment run.
///
/// Only [`AssignmentConfigBuilder::build`] and [`Default`] construct a config, so the class
/// order is never empty and never names a class twice.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentConfig {
    class_order: Vec<InteractionClass>,
    warn_unused_rules: bool,
    parallel: bool,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            class_order: InteractionClass::ALL.to_vec(),
            warn_unused_rules: false,
            parallel: true,
        }
    }
}

impl AssignmentConfig {
    pub fn builder() -> AssignmentConfigBuilder {
        AssignmentConfigBuilder::new()
    }

    /// Classes to process, in order. Classes absent from the list are not assigned.
    pub fn class_order(&self) -> &[InteractionClass] {
        &self.class_order
    }

    /// Whether every rule that wins no site is reported as a warning.
    pub fn warn_unused_rules(&self) -> bool {
        self.warn_unused_rules
    }

    /// Whether the rules of a class are matched on the rayon pool. Has no effect when the
    /// crate is built without the `parallel` feature.
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

#[derive(Default)]
pub struct AssignmentConfigBuilder {
    class_order: Option<Vec<InteractionClass>>,
    warn_unused_rules: Option<bool>,
    parallel: Option<bool>,
}

impl AssignmentConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_order(mut self, classes: impl IntoIterator<Item = InteractionClass>) -> Self {
        self.class_order = Some(classes.into_iter().collect());
        self
    }
    pub fn warn_unused_rules(mut self, enabled: bool) -> Self {
        self.warn_unused_rules = Some(enabled);
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = Some(enabled);
        self
    }

    pub fn build(self) -> Result<AssignmentConfig, ConfigError> {
        let defaults = AssignmentConfig::default();
        let class_order = self.class_order.unwrap_or(defaults.class_order);

        if class_order.is_empty() {
            return Err(ConfigError::EmptyClassOrder);
        }
        let mut seen = HashSet::new();
        if let Some(&duplicate) = class_order.iter().find(|&&c| !seen.insert(c)) {
            return Err(ConfigError::DuplicateClass(duplicate));
        }

        Ok(AssignmentConfig {
            class_order,
            warn_unused_rules: self.warn_unused_rules.unwrap_or(defaults.warn_unused_rules),
            parallel: self.parallel.unwrap_or(defaults.parallel),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_processes_every_class_in_table_order() {
        let config = AssignmentConfig::default();
        assert_eq!(config.class_order(), InteractionClass::ALL);
        assert!(!config.warn_unused_rules());
        assert!(config.parallel());
    }

    #[test]
    fn builder_without_settings_matches_default() {
        assert_eq!(
            AssignmentConfig::builder().build().unwrap(),
            AssignmentConfig::default()
        );
    }

    #[test]
    fn builder_accepts_custom_order() {
        let config = AssignmentConfig::builder()
            .class_order([InteractionClass::Vdw, InteractionClass::Bond])
            .warn_unused_rules(true)
            .parallel(false)
            .build()
            .unwrap();
        assert_eq!(
            config.class_order(),
            [InteractionClass::Vdw, InteractionClass::Bond]
        );
        assert!(config.warn_unused_rules());
        assert!(!config.parallel());
    }

    #[test]
    fn builder_rejects_empty_order() {
        assert_eq!(
            AssignmentConfig::builder().class_order([]).build(),
            Err(ConfigError::EmptyClassOrder)
        );
    }

    #[test]
    fn builder_rejects_repeated_class() {
        assert_eq!(
            AssignmentConfig::builder()
                .class_order([
                    InteractionClass::Bond,
                    InteractionClass::Angle,
                    InteractionClass::Bond
                ])
                .build(),
            Err(ConfigError::DuplicateClass(InteractionClass::Bond))
        );
    }
}
