//! Reading and writing rule sets as TOML force-field files.
//!
//! A file has an optional `[meta]` table, an optional `[replacements]` table of named SMIRKS
//! fragments, and one table per interaction class. Each class table may declare the
//! `potential` it uses and any number of section-level settings, and lists its rules in a
//! `parameters` array of tables, in the order they should be tried:
//!
//! ```toml
//! [bonds]
//! potential = "harmonic"
//!
//! [[bonds.parameters]]
//! id = "b1"
//! smirks = "[#6X4:1]-[#6X4:2]"
//! length = 1.526
//! k = 620.0
//!
//! [[bonds.parameters]]
//! id = "b5"
//! smirks = "[#6X3:1]!#[#6X3:2]"
//! length-bondorder1 = 1.45
//! length-bondorder2 = 1.35
//! k-bondorder1 = 820.0
//! k-bondorder2 = 1098.0
//!
//! [vdw]
//! potential = "lennard-jones-12-6"
//! scale14 = 0.5
//! cutoff = 9.0
//!
//! [[proper-torsions.parameters]]
//! id = "t1"
//! smirks = "[*:1]-[#6X4:2]-[#6X4:3]-[*:4]"
//! terms = [{ periodicity = 3, phase = 0.0, k = 0.156 }]
//! ```

use super::class::InteractionClass;
use super::params::{ParameterValues, TorsionTerm, VdwSize};
use super::rule::Rule;
use super::ruleset::{ForceFieldMeta, RuleSet, RuleSetError, SectionAttributes};
use crate::core::smirks::Replacements;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ForceFieldDocument {
    #[serde(default, skip_serializing_if = "is_default_meta")]
    meta: ForceFieldMeta,
    #[serde(default, skip_serializing_if = "Replacements::is_empty")]
    replacements: Replacements,
    #[serde(skip_serializing_if = "Option::is_none")]
    bonds: Option<SectionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    angles: Option<SectionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proper_torsions: Option<SectionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    improper_torsions: Option<SectionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vdw: Option<SectionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    electrostatics: Option<SectionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bond_charge_corrections: Option<SectionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<SectionDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gbsa: Option<SectionDocument>,
}

fn is_default_meta(meta: &ForceFieldMeta) -> bool {
    meta == &ForceFieldMeta::default()
}

impl ForceFieldDocument {
    fn into_sections(self) -> Vec<(InteractionClass, SectionDocument)> {
        [
            (InteractionClass::Bond, self.bonds),
            (InteractionClass::Angle, self.angles),
            (InteractionClass::ProperTorsion, self.proper_torsions),
            (InteractionClass::ImproperTorsion, self.improper_torsions),
            (InteractionClass::Vdw, self.vdw),
            (InteractionClass::Electrostatic, self.electrostatics),
            (InteractionClass::BondChargeCorrection, self.bond_charge_corrections),
            (InteractionClass::Constraint, self.constraints),
            (InteractionClass::Gbsa, self.gbsa),
        ]
        .into_iter()
        .filter_map(|(class, section)| section.map(|s| (class, s)))
        .collect()
    }

    fn section_mut(&mut self, class: InteractionClass) -> &mut Option<SectionDocument> {
        match class {
            InteractionClass::Bond => &mut self.bonds,
            InteractionClass::Angle => &mut self.angles,
            InteractionClass::ProperTorsion => &mut self.proper_torsions,
            InteractionClass::ImproperTorsion => &mut self.improper_torsions,
            InteractionClass::Vdw => &mut self.vdw,
            InteractionClass::Electrostatic => &mut self.electrostatics,
            InteractionClass::BondChargeCorrection => &mut self.bond_charge_corrections,
            InteractionClass::Constraint => &mut self.constraints,
            InteractionClass::Gbsa => &mut self.gbsa,
        }
    }
}

impl From<&RuleSet> for ForceFieldDocument {
    fn from(set: &RuleSet) -> Self {
        let mut document = ForceFieldDocument {
            meta: set.meta().clone(),
            replacements: set.replacements().clone(),
            ..Default::default()
        };
        for class in InteractionClass::ALL {
            let section = SectionDocument {
                potential: set.potential(class).map(str::to_string),
                attributes: set.attributes(class).cloned().unwrap_or_default(),
                parameters: set.rules(class).iter().map(RuleDocument::from).collect(),
            };
            if section.potential.is_some()
                || !section.attributes.is_empty()
                || !section.parameters.is_empty()
            {
                *document.section_mut(class) = Some(section);
            }
        }
        document
    }
}

/// One class table. Keys other than `potential` and `parameters` are section attributes.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SectionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    potential: Option<String>,
    #[serde(flatten)]
    attributes: SectionAttributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<RuleDocument>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RuleDocument {
    id: String,
    smirks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length_bondorder1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length_bondorder2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    k_bondorder1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    k_bondorder2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    terms: Option<Vec<TorsionTerm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    epsilon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sigma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rmin_half: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    charge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    increment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
}

impl From<&Rule> for RuleDocument {
    fn from(rule: &Rule) -> Self {
        let mut doc = RuleDocument {
            id: rule.id().to_string(),
            smirks: rule.smirks().to_string(),
            parent_id: rule.parent_id().map(str::to_string),
            ..Default::default()
        };
        match rule.params().clone() {
            ParameterValues::Bond { length, k } => {
                doc.length = Some(length);
                doc.k = Some(k);
            }
            ParameterValues::InterpolatedBond { length, k } => {
                doc.length_bondorder1 = Some(length[0]);
                doc.length_bondorder2 = Some(length[1]);
                doc.k_bondorder1 = Some(k[0]);
                doc.k_bondorder2 = Some(k[1]);
            }
            ParameterValues::Angle { angle, k } => {
                doc.angle = Some(angle);
                doc.k = Some(k);
            }
            ParameterValues::ProperTorsion { terms }
            | ParameterValues::ImproperTorsion { terms } => doc.terms = Some(terms),
            ParameterValues::Vdw { epsilon, size } => {
                doc.epsilon = Some(epsilon);
                match size {
                    VdwSize::Sigma(sigma) => doc.sigma = Some(sigma),
                    VdwSize::RminHalf(rmin_half) => doc.rmin_half = Some(rmin_half),
                }
            }
            ParameterValues::Electrostatic { charge } => doc.charge = Some(charge),
            ParameterValues::BondChargeCorrection { increment } => doc.increment = Some(increment),
            ParameterValues::Constraint { distance } => doc.distance = distance,
            ParameterValues::Gbsa { radius, scale } => {
                doc.radius = Some(radius);
                doc.scale = Some(scale);
            }
        }
        doc
    }
}

impl RuleDocument {
    fn present_fields(&self) -> Vec<&'static str> {
        [
            ("length", self.length.is_some()),
            ("k", self.k.is_some()),
            ("length-bondorder1", self.length_bondorder1.is_some()),
            ("length-bondorder2", self.length_bondorder2.is_some()),
            ("k-bondorder1", self.k_bondorder1.is_some()),
            ("k-bondorder2", self.k_bondorder2.is_some()),
            ("angle", self.angle.is_some()),
            ("terms", self.terms.is_some()),
            ("epsilon", self.epsilon.is_some()),
            ("sigma", self.sigma.is_some()),
            ("rmin-half", self.rmin_half.is_some()),
            ("charge", self.charge.is_some()),
            ("increment", self.increment.is_some()),
            ("distance", self.distance.is_some()),
            ("radius", self.radius.is_some()),
            ("scale", self.scale.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    fn require<T: Clone>(&self, value: &Option<T>, field: &'static str) -> Result<T, RuleSetError> {
        value.clone().ok_or_else(|| RuleSetError::MissingField {
            rule_id: self.id.clone(),
            field,
        })
    }

    fn has_bond_order_fields(&self) -> bool {
        self.length_bondorder1.is_some()
            || self.length_bondorder2.is_some()
            || self.k_bondorder1.is_some()
            || self.k_bondorder2.is_some()
    }

    fn bond_parameters(&self) -> Result<ParameterValues, RuleSetError> {
        if !self.has_bond_order_fields() {
            return Ok(ParameterValues::Bond {
                length: self.require(&self.length, "length")?,
                k: self.require(&self.k, "k")?,
            });
        }
        if let Some(field) = [("length", self.length), ("k", self.k)]
            .into_iter()
            .find_map(|(name, value)| value.map(|_| name))
        {
            return Err(RuleSetError::UnexpectedField {
                rule_id: self.id.clone(),
                class: InteractionClass::Bond,
                field,
            });
        }
        Ok(ParameterValues::InterpolatedBond {
            length: [
                self.require(&self.length_bondorder1, "length-bondorder1")?,
                self.require(&self.length_bondorder2, "length-bondorder2")?,
            ],
            k: [
                self.require(&self.k_bondorder1, "k-bondorder1")?,
                self.require(&self.k_bondorder2, "k-bondorder2")?,
            ],
        })
    }

    fn parameters(&self, class: InteractionClass) -> Result<ParameterValues, RuleSetError> {
        let allowed: &[&str] = match class {
            InteractionClass::Bond => &[
                "length",
                "k",
                "length-bondorder1",
                "length-bondorder2",
                "k-bondorder1",
                "k-bondorder2",
            ],
            InteractionClass::Angle => &["angle", "k"],
            InteractionClass::ProperTorsion | InteractionClass::ImproperTorsion => &["terms"],
            InteractionClass::Vdw => &["epsilon", "sigma", "rmin-half"],
            InteractionClass::Electrostatic => &["charge"],
            InteractionClass::BondChargeCorrection => &["increment"],
            InteractionClass::Constraint => &["distance"],
            InteractionClass::Gbsa => &["radius", "scale"],
        };
        if let Some(field) = self
            .present_fields()
            .into_iter()
            .find(|f| !allowed.contains(f))
        {
            return Err(RuleSetError::UnexpectedField {
                rule_id: self.id.clone(),
                class,
                field,
            });
        }

        Ok(match class {
            InteractionClass::Bond => self.bond_parameters()?,
            InteractionClass::Angle => ParameterValues::Angle {
                angle: self.require(&self.angle, "angle")?,
                k: self.require(&self.k, "k")?,
            },
            InteractionClass::ProperTorsion => ParameterValues::ProperTorsion {
                terms: self.require(&self.terms, "terms")?,
            },
            InteractionClass::ImproperTorsion => ParameterValues::ImproperTorsion {
                terms: self.require(&self.terms, "terms")?,
            },
            InteractionClass::Vdw => {
                let size = match (self.sigma, self.rmin_half) {
                    (Some(sigma), None) => VdwSize::Sigma(sigma),
                    (None, Some(rmin_half)) => VdwSize::RminHalf(rmin_half),
                    (None, None) => {
                        return Err(RuleSetError::MissingField {
                            rule_id: self.id.clone(),
                            field: "sigma",
                        });
                    }
                    (Some(_), Some(_)) => {
                        return Err(RuleSetError::UnexpectedField {
                            rule_id: self.id.clone(),
                            class,
                            field: "rmin-half",
                        });
                    }
                };
                ParameterValues::Vdw {
                    epsilon: self.require(&self.epsilon, "epsilon")?,
                    size,
                }
            }
            InteractionClass::Electrostatic => ParameterValues::Electrostatic {
                charge: self.require(&self.charge, "charge")?,
            },
            InteractionClass::BondChargeCorrection => ParameterValues::BondChargeCorrection {
                increment: self.require(&self.increment, "increment")?,
            },
            InteractionClass::Constraint => ParameterValues::Constraint {
                distance: self.distance,
            },
            InteractionClass::Gbsa => ParameterValues::Gbsa {
                radius: self.require(&self.radius, "radius")?,
                scale: self.require(&self.scale, "scale")?,
            },
        })
    }
}

/// Compiles a document into a rule set of its own. `inherited` holds the replacements of
/// the documents loaded before it.
fn compile(
    mut document: ForceFieldDocument,
    inherited: &Replacements,
) -> Result<RuleSet, RuleSetError> {
    let mut staged = RuleSet::new();
    staged.set_meta(std::mem::take(&mut document.meta));

    let mut replacements = inherited.clone();
    for (name, smirks) in std::mem::take(&mut document.replacements) {
        replacements.insert(name.clone(), smirks.clone());
        staged.add_replacement(name, smirks);
    }

    for (class, section) in document.into_sections() {
        if let Some(potential) = section.potential {
            staged.set_potential(class, potential);
        }
        for (name, value) in section.attributes {
            debug!(class = %class, attribute = %name, "Section attribute");
            staged.set_attribute(class, name, value);
        }
        for entry in section.parameters {
            let params = entry.parameters(class)?;
            let mut rule = Rule::with_replacements(
                entry.id.clone(),
                class,
                &entry.smirks,
                params,
                &replacements,
            )?;
            if let Some(parent) = entry.parent_id {
                rule = rule.with_parent(parent);
            }
            debug!(rule_id = %rule.id(), class = %class, "Compiled rule");
            staged.push(rule)?;
        }
    }
    Ok(staged)
}

impl RuleSet {
    /// Parses one force-field document and returns it as a new rule set.
    ///
    /// `origin` names the source in error messages, typically the file path.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, RuleSetError> {
        let mut set = RuleSet::new();
        set.append_toml_str(text, origin)?;
        Ok(set)
    }

    /// Parses one force-field document and appends its rules after the existing ones.
    ///
    /// Replacements already present in the set are visible to the new document's patterns.
    /// The document is compiled completely before anything is merged, so on error the set is
    /// left as it was.
    pub fn append_toml_str(&mut self, text: &str, origin: &str) -> Result<(), RuleSetError> {
        let document: ForceFieldDocument =
            toml::from_str(text).map_err(|source| RuleSetError::Toml {
                path: origin.to_string(),
                source,
            })?;

        let staged = compile(document, self.replacements())?;
        let rules = staged.len();
        self.extend(staged)?;

        info!(origin = %origin, rules, "Loaded force-field document");
        Ok(())
    }

    /// Loads a single force-field file.
    pub fn load(path: &Path) -> Result<Self, RuleSetError> {
        Self::load_all(&[path])
    }

    /// Loads several force-field files and merges them in the order given.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self, RuleSetError> {
        let mut set = RuleSet::new();
        for path in paths {
            let path = path.as_ref();
            let origin = path.to_string_lossy().to_string();
            let text = std::fs::read_to_string(path).map_err(|source| RuleSetError::Io {
                path: origin.clone(),
                source,
            })?;
            set.append_toml_str(&text, &origin)?;
        }
        Ok(set)
    }

    /// Writes the set as a single force-field document.
    ///
    /// Reading the text back with [`from_toml_str`](Self::from_toml_str) yields the same rules
    /// in the same order. Replacements are written with their final definition.
    pub fn to_toml_string(&self) -> Result<String, RuleSetError> {
        Ok(toml::to_string(&ForceFieldDocument::from(self))?)
    }

    pub fn save(&self, path: &Path) -> Result<(), RuleSetError> {
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|source| RuleSetError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        info!(path = %path.display(), rules = self.len(), "Saved force field");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
        [meta]
        name = "sample"
        version = "0.1"

        [replacements]
        hydroxyl_o = "[#8X2]-[#1]"

        [bonds]
        potential = "harmonic"

        [[bonds.parameters]]
        id = "b1"
        smirks = "[#6X4:1]-[#6X4:2]"
        length = 1.526
        k = 620.0

        [[bonds.parameters]]
        id = "b2"
        parent-id = "b1"
        smirks = "[#6X4:1]-[#1:2]"
        length = 1.09
        k = 680.0

        [[proper-torsions.parameters]]
        id = "t1"
        smirks = "[*:1]-[#6X4:2]-[#6X4:3]-[*:4]"
        terms = [
            { periodicity = 3, phase = 0.0, k = 0.156, idivf = 1.0 },
            { periodicity = 1, phase = 180.0, k = 0.2 },
        ]

        [[vdw.parameters]]
        id = "n1"
        smirks = "[#1:1]"
        epsilon = 0.0157
        rmin-half = 0.6

        [[constraints.parameters]]
        id = "c1"
        smirks = "[#1:1]-[$hydroxyl_o:2]"
        "#;

    #[test]
    fn from_toml_str_loads_all_sections_in_order() {
        let set = RuleSet::from_toml_str(SAMPLE, "sample.toml").unwrap();
        assert_eq!(set.meta().name.as_deref(), Some("sample"));
        assert_eq!(set.len(), 5);
        assert_eq!(set.potential(InteractionClass::Bond), Some("harmonic"));

        let bonds: Vec<_> = set.rules(InteractionClass::Bond).iter().map(Rule::id).collect();
        assert_eq!(bonds, vec!["b1", "b2"]);
        assert_eq!(set.get("b2").unwrap().parent_id(), Some("b1"));

        let torsion = set.get("t1").unwrap();
        assert_eq!(torsion.params().torsion_terms().map(<[_]>::len), Some(2));
        assert_eq!(torsion.params().torsion_terms().unwrap()[1].idivf, 1.0);

        assert_eq!(
            set.get("n1").unwrap().params(),
            &ParameterValues::Vdw {
                epsilon: 0.0157,
                size: VdwSize::RminHalf(0.6)
            }
        );
        assert_eq!(
            set.get("c1").unwrap().params(),
            &ParameterValues::Constraint { distance: None }
        );
    }

    #[test]
    fn missing_parameter_field_is_reported() {
        let text = r#"
            [[bonds.parameters]]
            id = "b1"
            smirks = "[*:1]~[*:2]"
            length = 1.0
        "#;
        let err = RuleSet::from_toml_str(text, "x").unwrap_err();
        assert!(matches!(
            err,
            RuleSetError::MissingField { field: "k", .. }
        ));
    }

    #[test]
    fn field_of_another_class_is_rejected() {
        let text = r#"
            [[electrostatics.parameters]]
            id = "q1"
            smirks = "[*:1]"
            charge = 0.0
            length = 1.0
        "#;
        let err = RuleSet::from_toml_str(text, "x").unwrap_err();
        assert!(matches!(
            err,
            RuleSetError::UnexpectedField { field: "length", .. }
        ));
    }

    #[test]
    fn unknown_section_is_a_toml_error() {
        let err = RuleSet::from_toml_str("[dihedrals]\n", "bad.toml").unwrap_err();
        assert!(matches!(err, RuleSetError::Toml { path, .. } if path == "bad.toml"));
    }

    #[test]
    fn invalid_pattern_names_the_rule() {
        let text = r#"
            [[angles.parameters]]
            id = "a-bad"
            smirks = "[*:1]~[*:2]~[*:3"
            angle = 109.5
            k = 100.0
        "#;
        let err = RuleSet::from_toml_str(text, "x").unwrap_err();
        assert!(matches!(err, RuleSetError::Pattern { rule_id, .. } if rule_id == "a-bad"));
    }

    #[test]
    fn load_all_merges_files_in_order() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base.toml");
        let overlay = dir.path().join("overlay.toml");
        fs::write(
            &base,
            r#"
            [replacements]
            carbon = "[#6]"

            [[bonds.parameters]]
            id = "generic"
            smirks = "[*:1]~[*:2]"
            length = 1.0
            k = 100.0
            "#,
        )
        .unwrap();
        fs::write(
            &overlay,
            r#"
            [[bonds.parameters]]
            id = "cc"
            smirks = "[$carbon:1]-[$carbon:2]"
            length = 1.5
            k = 600.0
            "#,
        )
        .unwrap();

        let set = RuleSet::load_all(&[&base, &overlay]).unwrap();
        let ids: Vec<_> = set.rules(InteractionClass::Bond).iter().map(Rule::id).collect();
        assert_eq!(ids, vec!["generic", "cc"]);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = RuleSet::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(RuleSetError::Io { .. })));
    }

    #[test]
    fn duplicate_ids_across_files_are_rejected() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.toml");
        let b = dir.path().join("b.toml");
        let body = r#"
            [[vdw.parameters]]
            id = "n1"
            smirks = "[*:1]"
            epsilon = 0.1
            sigma = 3.0
        "#;
        fs::write(&a, body).unwrap();
        fs::write(&b, body).unwrap();
        assert!(matches!(
            RuleSet::load_all(&[a, b]),
            Err(RuleSetError::DuplicateId { .. })
        ));
    }

    #[test]
    fn bond_order_parameters_load_as_interpolated_bond() {
        let text = r#"
            [[bonds.parameters]]
            id = "b5"
            smirks = "[#6X3:1]!#[#6X3:2]"
            length-bondorder1 = 1.45
            length-bondorder2 = 1.35
            k-bondorder1 = 820.0
            k-bondorder2 = 1098
        "#;
        let set = RuleSet::from_toml_str(text, "x").unwrap();
        assert_eq!(
            set.get("b5").unwrap().params(),
            &ParameterValues::InterpolatedBond {
                length: [1.45, 1.35],
                k: [820.0, 1098.0],
            }
        );
    }

    #[test]
    fn bond_order_parameters_must_be_complete_and_exclusive() {
        let incomplete = r#"
            [[bonds.parameters]]
            id = "b5"
            smirks = "[#6X3:1]!#[#6X3:2]"
            length-bondorder1 = 1.45
            length-bondorder2 = 1.35
            k-bondorder1 = 820.0
        "#;
        assert!(matches!(
            RuleSet::from_toml_str(incomplete, "x").unwrap_err(),
            RuleSetError::MissingField { field: "k-bondorder2", .. }
        ));

        let mixed = r#"
            [[bonds.parameters]]
            id = "b5"
            smirks = "[#6X3:1]!#[#6X3:2]"
            length = 1.4
            length-bondorder1 = 1.45
            length-bondorder2 = 1.35
            k-bondorder1 = 820.0
            k-bondorder2 = 1098.0
        "#;
        assert!(matches!(
            RuleSet::from_toml_str(mixed, "x").unwrap_err(),
            RuleSetError::UnexpectedField { field: "length", .. }
        ));

        let wrong_class = r#"
            [[angles.parameters]]
            id = "a1"
            smirks = "[*:1]~[*:2]~[*:3]"
            angle = 109.5
            k = 50.0
            k-bondorder1 = 1.0
        "#;
        assert!(matches!(
            RuleSet::from_toml_str(wrong_class, "x").unwrap_err(),
            RuleSetError::UnexpectedField { field: "k-bondorder1", .. }
        ));
    }

    #[test]
    fn section_settings_load_as_attributes() {
        let text = r#"
            [vdw]
            potential = "lennard-jones-12-6"
            combining-rules = "lorentz-berthelot"
            scale14 = 0.5
            switch = 8.0
            cutoff = 9.0

            [[vdw.parameters]]
            id = "n1"
            smirks = "[*:1]"
            epsilon = 0.1
            sigma = 3.0

            [improper-torsions]
            potential = "charmm"
            default-idivf = "auto"

            [gbsa]
            gb-model = "OBC1"
            solvent-dielectric = 78.5
            solute-dielectric = 1
        "#;
        let set = RuleSet::from_toml_str(text, "x").unwrap();
        assert_eq!(set.potential(InteractionClass::Vdw), Some("lennard-jones-12-6"));
        assert_eq!(
            set.attribute(InteractionClass::Vdw, "scale14"),
            Some(&toml::Value::Float(0.5))
        );
        assert_eq!(
            set.attribute(InteractionClass::Vdw, "combining-rules")
                .and_then(toml::Value::as_str),
            Some("lorentz-berthelot")
        );
        assert_eq!(set.attributes(InteractionClass::Vdw).map(|a| a.len()), Some(4));
        assert_eq!(
            set.attribute(InteractionClass::ImproperTorsion, "default-idivf")
                .and_then(toml::Value::as_str),
            Some("auto")
        );
        assert_eq!(
            set.attribute(InteractionClass::Gbsa, "solute-dielectric"),
            Some(&toml::Value::Integer(1))
        );
        assert!(set.attributes(InteractionClass::Bond).is_none());
    }

    #[test]
    fn to_toml_string_reloads_into_the_same_rules() {
        let mut original = RuleSet::from_toml_str(SAMPLE, "sample.toml").unwrap();
        original
            .append_toml_str(
                r#"
            [vdw]
            cutoff = 9.0

            [[bonds.parameters]]
            id = "b5"
            smirks = "[#6X3:1]!#[#6X3:2]"
            length-bondorder1 = 1.45
            length-bondorder2 = 1.35
            k-bondorder1 = 820.0
            k-bondorder2 = 1098.0
            "#,
                "overlay.toml",
            )
            .unwrap();
        let written = original.to_toml_string().unwrap();
        let reloaded = RuleSet::from_toml_str(&written, "written.toml").unwrap();

        assert_eq!(reloaded.meta(), original.meta());
        assert_eq!(reloaded.replacements(), original.replacements());
        for class in InteractionClass::ALL {
            assert_eq!(reloaded.rules(class), original.rules(class), "{class}");
            assert_eq!(reloaded.potential(class), original.potential(class));
            assert_eq!(reloaded.attributes(class), original.attributes(class));
        }
        assert_eq!(reloaded.to_toml_string().unwrap(), written);
    }

    #[test]
    fn edited_parameters_are_written() {
        let mut set = RuleSet::from_toml_str(SAMPLE, "sample.toml").unwrap();
        set.set_parameters(
            "b2",
            ParameterValues::Bond {
                length: 1.1,
                k: 700.0,
            },
        )
        .unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("edited.toml");
        set.save(&path).unwrap();
        let reloaded = RuleSet::load(&path).unwrap();
        assert_eq!(
            reloaded.get("b2").unwrap().params(),
            &ParameterValues::Bond {
                length: 1.1,
                k: 700.0
            }
        );
        assert_eq!(reloaded.get("b2").unwrap().declaration_index(), 1);
    }

    #[test]
    fn failed_append_leaves_the_set_unchanged() {
        let mut set = RuleSet::from_toml_str(SAMPLE, "sample.toml").unwrap();
        let broken = r#"
            [replacements]
            carbonyl = "[#6X3]=[#8]"

            [bonds]
            potential = "morse"

            [[bonds.parameters]]
            id = "b-new"
            smirks = "[#6:1]=[#8:2]"
            length = 1.2
            k = 1000.0

            [[bonds.parameters]]
            id = "b-broken"
            smirks = "[#6:1]=[#8:2"
            length = 1.2
            k = 1000.0
        "#;
        assert!(matches!(
            set.append_toml_str(broken, "broken.toml"),
            Err(RuleSetError::Pattern { rule_id, .. }) if rule_id == "b-broken"
        ));
        assert_eq!(set.len(), 5);
        assert!(set.get("b-new").is_none());
        assert!(!set.replacements().contains_key("carbonyl"));
        assert_eq!(set.potential(InteractionClass::Bond), Some("harmonic"));

        let colliding = r#"
            [[angles.parameters]]
            id = "a1"
            smirks = "[*:1]~[*:2]~[*:3]"
            angle = 109.5
            k = 50.0

            [[constraints.parameters]]
            id = "b1"
            smirks = "[*:1]~[*:2]"
        "#;
        assert!(matches!(
            set.append_toml_str(colliding, "colliding.toml"),
            Err(RuleSetError::DuplicateId { rule_id }) if rule_id == "b1"
        ));
        assert!(set.get("a1").is_none());
        assert_eq!(set.len(), 5);
    }
}
