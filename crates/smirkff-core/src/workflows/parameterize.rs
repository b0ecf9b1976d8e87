use crate::core::forcefield::ruleset::RuleSet;
use crate::core::models::molecule::{Molecule, MoleculeRecord};
use crate::core::models::parameterized::ParameterizedTopology;
use crate::engine::config::AssignmentConfig;
use crate::engine::diagnostics::Diagnostics;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::resolver::Resolver;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct AssignmentResult {
    pub topology: ParameterizedTopology,
    pub diagnostics: Diagnostics,
}

/// Assigns every configured interaction class of `rules` to `molecule`.
///
/// Fails with [`EngineError::UnassignableSite`] when a required class leaves a site without a
/// matching rule. Nothing is returned for the molecule in that case.
#[instrument(skip_all, name = "parameterize_workflow", fields(molecule = %molecule.name()))]
pub fn run(
    molecule: &Molecule,
    rules: &RuleSet,
    config: &AssignmentConfig,
    reporter: &ProgressReporter,
) -> Result<AssignmentResult, EngineError> {
    info!(
        atoms = molecule.atom_count(),
        bonds = molecule.bond_count(),
        rules = rules.len(),
        "Starting parameter assignment."
    );
    let (topology, diagnostics) = Resolver::new(rules, config, reporter).resolve(molecule)?;
    Ok(AssignmentResult {
        topology,
        diagnostics,
    })
}

/// Like [`run`], but validates the molecular graph from its serialized record first.
pub fn run_record(
    record: &MoleculeRecord,
    rules: &RuleSet,
    config: &AssignmentConfig,
    reporter: &ProgressReporter,
) -> Result<AssignmentResult, EngineError> {
    let molecule = Molecule::try_from(record)?;
    run(&molecule, rules, config, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::class::InteractionClass;
    use crate::core::forcefield::params::ParameterValues;
    use crate::core::models::fixtures;
    use crate::core::models::molecule::{AtomRecord, BondRecord};

    const FORCE_FIELD: &str = r#"
[meta]
name = "wildcards"

[bonds]
potential = "harmonic"
[[bonds.parameters]]
id = "b1"
smirks = "[*:1]~[*:2]"
length = 1.1
k = 600.0
[[bonds.parameters]]
id = "b2"
smirks = "[#6:1]-[#8:2]"
length = 1.43
k = 640.0

[angles]
[[angles.parameters]]
id = "a1"
smirks = "[*:1]~[*:2]~[*:3]"
angle = 109.5
k = 100.0

[proper-torsions]
[[proper-torsions.parameters]]
id = "t1"
smirks = "[*:1]~[*:2]~[*:3]~[*:4]"
terms = [{ periodicity = 3, phase = 0.0, k = 0.15 }]

[vdw]
scale14 = 0.5
cutoff = 9.0
[[vdw.parameters]]
id = "n1"
smirks = "[*:1]"
epsilon = 0.01
rmin-half = 1.4
[[vdw.parameters]]
id = "n2"
smirks = "[#8:1]"
epsilon = 0.21
rmin-half = 1.66

[electrostatics]
[[electrostatics.parameters]]
id = "q1"
smirks = "[*:1]"
charge = 0.0

[gbsa]
[[gbsa.parameters]]
id = "g1"
smirks = "[*:1]"
radius = 1.5
scale = 0.8
"#;

    fn rules() -> RuleSet {
        RuleSet::from_toml_str(FORCE_FIELD, "inline").unwrap()
    }

    #[test]
    fn wildcard_fallbacks_cover_every_required_site() {
        let rules = rules();
        let methanol = fixtures::methanol();
        let result = run(
            &methanol,
            &rules,
            &AssignmentConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        let topology = &result.topology;
        assert_eq!(topology.molecule(), "methanol");
        assert_eq!(topology.class(InteractionClass::Bond).unwrap().len(), 5);
        assert_eq!(
            topology.class(InteractionClass::Bond).unwrap().potential(),
            Some("harmonic")
        );
        assert_eq!(
            topology.lookup(InteractionClass::Bond, &[1, 0]).unwrap().rule_id,
            "b2"
        );
        assert_eq!(
            topology.lookup(InteractionClass::Vdw, &[1]).unwrap().rule_id,
            "n2"
        );
        assert_eq!(topology.class(InteractionClass::Angle).unwrap().len(), 7);
        assert_eq!(
            topology.class(InteractionClass::ProperTorsion).unwrap().len(),
            3
        );
        assert!(topology.class(InteractionClass::ImproperTorsion).is_none());
        assert!(result.diagnostics.unused.is_empty());

        let vdw = topology.class(InteractionClass::Vdw).unwrap();
        assert_eq!(vdw.attribute("cutoff"), Some(&toml::Value::Float(9.0)));
        assert!(topology.class(InteractionClass::Bond).unwrap().attributes().is_empty());
    }

    #[test]
    fn edited_parameters_apply_to_the_next_run() {
        let mut rules = rules();
        let methanol = fixtures::methanol();
        let config = AssignmentConfig::default();
        let assign = |rules: &RuleSet| {
            run(&methanol, rules, &config, &ProgressReporter::new())
                .unwrap()
                .topology
        };

        let before = assign(&rules);
        let updated = ParameterValues::Bond {
            length: 1.41,
            k: 700.0,
        };
        rules.set_parameters("b2", updated.clone()).unwrap();
        let after = assign(&rules);

        assert_ne!(
            before.lookup(InteractionClass::Bond, &[0, 1]).unwrap().params,
            updated
        );
        let term = after.lookup(InteractionClass::Bond, &[0, 1]).unwrap();
        assert_eq!((term.rule_id.as_str(), &term.params), ("b2", &updated));
        assert_eq!(
            after.lookup(InteractionClass::Bond, &[0, 2]),
            before.lookup(InteractionClass::Bond, &[0, 2])
        );

        let written = rules.to_toml_string().unwrap();
        let reloaded = RuleSet::from_toml_str(&written, "written").unwrap();
        assert_eq!(assign(&reloaded), after);
    }

    #[test]
    fn repeated_runs_serialize_identically() {
        let rules = rules();
        let butane = fixtures::butane();
        let config = AssignmentConfig::default();
        let render = || {
            let result = run(&butane, &rules, &config, &ProgressReporter::new()).unwrap();
            toml::to_string(&result.topology).unwrap()
        };
        let first = render();
        assert!(!first.is_empty());
        assert_eq!(first, render());
    }

    #[test]
    fn run_record_rejects_malformed_graph() {
        let record = MoleculeRecord {
            name: "broken".to_string(),
            atoms: vec![AtomRecord {
                element: "C".to_string(),
                name: None,
                charge: 0,
                aromatic: false,
                implicit_hydrogens: 4,
                ring_sizes: Vec::new(),
            }],
            bonds: vec![BondRecord {
                atoms: [0, 4],
                order: "single".to_string(),
                aromatic: None,
                ring: false,
                stereo: false,
                fractional_order: None,
            }],
        };
        let err = run_record(
            &record,
            &rules(),
            &AssignmentConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::MalformedGraph { .. }));
    }
}
