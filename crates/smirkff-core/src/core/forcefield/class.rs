use crate::core::smirks::MatchSymmetry;
use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The kinds of interaction a force field assigns parameters to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum InteractionClass {
    Bond,
    Angle,
    ProperTorsion,
    ImproperTorsion,
    Vdw,
    Electrostatic,
    BondChargeCorrection,
    Constraint,
    Gbsa,
}

/// Whether every candidate site of a class must receive a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coverage {
    /// An unmatched site makes the whole molecule unassignable.
    Required,
    /// Unmatched sites are left without a term.
    Optional,
}

/// Shape of the candidate sites of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteTopology {
    Atom,
    Bond,
    Angle,
    ProperTorsion,
    ImproperTorsion,
}

/// Static per-class behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub class: InteractionClass,
    /// Table name used in force-field files.
    pub section: &'static str,
    pub arity: usize,
    pub coverage: Coverage,
    pub symmetry: MatchSymmetry,
    pub sites: SiteTopology,
}

const fn descriptor(
    class: InteractionClass,
    section: &'static str,
    arity: usize,
    coverage: Coverage,
    symmetry: MatchSymmetry,
    sites: SiteTopology,
) -> ClassDescriptor {
    ClassDescriptor {
        class,
        section,
        arity,
        coverage,
        symmetry,
        sites,
    }
}

use Coverage::{Optional, Required};
use InteractionClass as C;
use MatchSymmetry::{CenterAnchored, Exact, Reversible};

// Indexed by discriminant.
static DESCRIPTORS: [ClassDescriptor; 9] = [
    descriptor(C::Bond, "bonds", 2, Required, Reversible, SiteTopology::Bond),
    descriptor(C::Angle, "angles", 3, Required, Reversible, SiteTopology::Angle),
    descriptor(
        C::ProperTorsion,
        "proper-torsions",
        4,
        Required,
        Reversible,
        SiteTopology::ProperTorsion,
    ),
    descriptor(
        C::ImproperTorsion,
        "improper-torsions",
        4,
        Optional,
        CenterAnchored,
        SiteTopology::ImproperTorsion,
    ),
    descriptor(C::Vdw, "vdw", 1, Required, Exact, SiteTopology::Atom),
    descriptor(C::Electrostatic, "electrostatics", 1, Required, Exact, SiteTopology::Atom),
    descriptor(
        C::BondChargeCorrection,
        "bond-charge-corrections",
        2,
        Optional,
        Reversible,
        SiteTopology::Bond,
    ),
    descriptor(C::Constraint, "constraints", 2, Optional, Reversible, SiteTopology::Bond),
    descriptor(C::Gbsa, "gbsa", 1, Required, Exact, SiteTopology::Atom),
];

static CLASS_NAMES: Map<&'static str, InteractionClass> = phf_map! {
    "bonds" => InteractionClass::Bond,
    "bond" => InteractionClass::Bond,
    "angles" => InteractionClass::Angle,
    "angle" => InteractionClass::Angle,
    "proper-torsions" => InteractionClass::ProperTorsion,
    "proper-torsion" => InteractionClass::ProperTorsion,
    "propertorsions" => InteractionClass::ProperTorsion,
    "improper-torsions" => InteractionClass::ImproperTorsion,
    "improper-torsion" => InteractionClass::ImproperTorsion,
    "impropertorsions" => InteractionClass::ImproperTorsion,
    "vdw" => InteractionClass::Vdw,
    "electrostatics" => InteractionClass::Electrostatic,
    "electrostatic" => InteractionClass::Electrostatic,
    "bond-charge-corrections" => InteractionClass::BondChargeCorrection,
    "bond-charge-correction" => InteractionClass::BondChargeCorrection,
    "bondchargecorrections" => InteractionClass::BondChargeCorrection,
    "constraints" => InteractionClass::Constraint,
    "constraint" => InteractionClass::Constraint,
    "gbsa" => InteractionClass::Gbsa,
};

impl InteractionClass {
    /// All classes in default processing order.
    pub const ALL: [InteractionClass; 9] = [
        C::Bond,
        C::Angle,
        C::ProperTorsion,
        C::ImproperTorsion,
        C::Vdw,
        C::Electrostatic,
        C::BondChargeCorrection,
        C::Constraint,
        C::Gbsa,
    ];

    pub fn descriptor(self) -> &'static ClassDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Number of tagged atoms a pattern of this class must have.
    pub fn arity(self) -> usize {
        self.descriptor().arity
    }

    pub fn coverage(self) -> Coverage {
        self.descriptor().coverage
    }

    pub fn is_required(self) -> bool {
        self.coverage() == Coverage::Required
    }

    pub fn symmetry(self) -> MatchSymmetry {
        self.descriptor().symmetry
    }

    pub fn site_topology(self) -> SiteTopology {
        self.descriptor().sites
    }

    pub fn section_name(self) -> &'static str {
        self.descriptor().section
    }
}

impl fmt::Display for InteractionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown interaction class: '{0}'")]
pub struct ParseInteractionClassError(pub String);

impl FromStr for InteractionClass {
    type Err = ParseInteractionClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('_', "-");
        CLASS_NAMES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| ParseInteractionClassError(s.to_string()))
    }
}
