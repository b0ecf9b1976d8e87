use super::class::InteractionClass;
use serde::{Deserialize, Serialize};

/// One Fourier term of a torsion: `k / idivf * (1 + cos(periodicity * phi - phase))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TorsionTerm {
    pub periodicity: u32,
    /// Phase in degrees.
    pub phase: f64,
    pub k: f64,
    #[serde(default = "default_idivf")]
    pub idivf: f64,
}

fn default_idivf() -> f64 {
    1.0
}

impl TorsionTerm {
    pub fn new(periodicity: u32, phase: f64, k: f64) -> Self {
        Self {
            periodicity,
            phase,
            k,
            idivf: 1.0,
        }
    }
}

/// Van der Waals size, given either as `sigma` or as `rmin/2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VdwSize {
    Sigma(f64),
    RminHalf(f64),
}

impl VdwSize {
    pub fn sigma(self) -> f64 {
        match self {
            Self::Sigma(sigma) => sigma,
            Self::RminHalf(rmin_half) => 2.0 * rmin_half / 2f64.powf(1.0 / 6.0),
        }
    }

    pub fn rmin_half(self) -> f64 {
        match self {
            Self::Sigma(sigma) => sigma * 2f64.powf(1.0 / 6.0) / 2.0,
            Self::RminHalf(rmin_half) => rmin_half,
        }
    }
}

/// The parameter payload of a rule. Each variant belongs to exactly one interaction class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParameterValues {
    Bond {
        length: f64,
        k: f64,
    },
    /// Bond parameters given at bond orders 1 and 2, interpolated linearly at the fractional
    /// order of each matched bond.
    InterpolatedBond {
        length: [f64; 2],
        k: [f64; 2],
    },
    Angle {
        angle: f64,
        k: f64,
    },
    ProperTorsion {
        terms: Vec<TorsionTerm>,
    },
    ImproperTorsion {
        terms: Vec<TorsionTerm>,
    },
    Vdw {
        epsilon: f64,
        size: VdwSize,
    },
    Electrostatic {
        charge: f64,
    },
    BondChargeCorrection {
        increment: f64,
    },
    Constraint {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        distance: Option<f64>,
    },
    Gbsa {
        radius: f64,
        scale: f64,
    },
}

impl ParameterValues {
    pub fn class(&self) -> InteractionClass {
        match self {
            Self::Bond { .. } | Self::InterpolatedBond { .. } => InteractionClass::Bond,
            Self::Angle { .. } => InteractionClass::Angle,
            Self::ProperTorsion { .. } => InteractionClass::ProperTorsion,
            Self::ImproperTorsion { .. } => InteractionClass::ImproperTorsion,
            Self::Vdw { .. } => InteractionClass::Vdw,
            Self::Electrostatic { .. } => InteractionClass::Electrostatic,
            Self::BondChargeCorrection { .. } => InteractionClass::BondChargeCorrection,
            Self::Constraint { .. } => InteractionClass::Constraint,
            Self::Gbsa { .. } => InteractionClass::Gbsa,
        }
    }

    /// Resolves bond-order-dependent parameters at `order`.
    ///
    /// Interpolated bonds become plain [`Bond`](Self::Bond) values, extrapolating linearly
    /// outside `[1, 2]`. Every other variant is returned unchanged.
    pub fn at_bond_order(&self, order: f64) -> ParameterValues {
        match self {
            Self::InterpolatedBond { length, k } => {
                let lerp = |[at1, at2]: [f64; 2]| at1 + (order - 1.0) * (at2 - at1);
                Self::Bond {
                    length: lerp(*length),
                    k: lerp(*k),
                }
            }
            other => other.clone(),
        }
    }

    pub fn is_bond_order_dependent(&self) -> bool {
        matches!(self, Self::InterpolatedBond { .. })
    }

    /// Torsion terms, for the two torsion classes.
    pub fn torsion_terms(&self) -> Option<&[TorsionTerm]> {
        match self {
            Self::ProperTorsion { terms } | Self::ImproperTorsion { terms } => Some(terms),
            _ => None,
        }
    }
}
