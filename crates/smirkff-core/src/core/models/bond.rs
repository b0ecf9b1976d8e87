use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Contribution to the atom valence in half units (aromatic bonds count 1.5).
    pub(crate) fn half_valence(self) -> u32 {
        match self {
            Self::Single => 2,
            Self::Double => 4,
            Self::Triple => 6,
            Self::Aromatic => 3,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.half_valence()) / 2.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid bond order string: '{0}'")]
pub struct ParseBondOrderError(pub String);

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "1.5" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError(s.to_string())),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
            Self::Aromatic => "aromatic",
        })
    }
}

/// An undirected bond between two atom indices of a [`Molecule`](super::molecule::Molecule).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
    pub order: BondOrder,
    pub is_aromatic: bool,
    pub in_ring: bool,
    /// Set when the bond carries a double-bond stereo annotation.
    pub has_stereo: bool,
    /// Caller-supplied fractional bond order, such as a Wiberg bond order.
    pub fractional_order: Option<f64>,
}

impl Bond {
    /// Creates a bond; the aromatic flag follows the order and can be overridden afterwards.
    pub fn new(i: usize, j: usize, order: BondOrder) -> Self {
        Self {
            i,
            j,
            order,
            is_aromatic: order == BondOrder::Aromatic,
            in_ring: false,
            has_stereo: false,
            fractional_order: None,
        }
    }

    pub fn in_ring(mut self, in_ring: bool) -> Self {
        self.in_ring = in_ring;
        self
    }

    pub fn with_aromatic(mut self, is_aromatic: bool) -> Self {
        self.is_aromatic = is_aromatic;
        self
    }

    pub fn with_stereo(mut self, has_stereo: bool) -> Self {
        self.has_stereo = has_stereo;
        self
    }

    pub fn with_fractional_order(mut self, order: f64) -> Self {
        self.fractional_order = Some(order);
        self
    }

    /// Order used to interpolate bond-order-dependent parameters: the fractional order when
    /// one was supplied, the nominal order otherwise.
    pub fn effective_order(&self) -> f64 {
        self.fractional_order.unwrap_or_else(|| self.order.as_f64())
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.i == atom || self.j == atom
    }

    /// Returns the opposite endpoint, or `None` if `atom` is not part of this bond.
    pub fn other(&self, atom: usize) -> Option<usize> {
        if self.i == atom {
            Some(self.j)
        } else if self.j == atom {
            Some(self.i)
        } else {
            None
        }
    }

    /// Endpoints ordered so that the smaller index comes first.
    pub fn sorted_pair(&self) -> (usize, usize) {
        if self.i <= self.j {
            (self.i, self.j)
        } else {
            (self.j, self.i)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_order_from_str_parses_valid_strings() {
        assert_eq!("1".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("Single".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("d".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("3".parse::<BondOrder>().unwrap(), BondOrder::Triple);
        assert_eq!("1.5".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
        assert_eq!("ar".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
    }

    #[test]
    fn bond_order_from_str_rejects_invalid_strings() {
        assert_eq!(
            "quadruple".parse::<BondOrder>(),
            Err(ParseBondOrderError("quadruple".to_string()))
        );
        assert!("".parse::<BondOrder>().is_err());
        assert!("0".parse::<BondOrder>().is_err());
    }

    #[test]
    fn bond_order_display_round_trips_through_from_str() {
        for order in [
            BondOrder::Single,
            BondOrder::Double,
            BondOrder::Triple,
            BondOrder::Aromatic,
        ] {
            assert_eq!(order.to_string().parse::<BondOrder>().unwrap(), order);
        }
    }

    #[test]
    fn aromatic_order_sets_aromatic_flag() {
        assert!(Bond::new(0, 1, BondOrder::Aromatic).is_aromatic);
        assert!(!Bond::new(0, 1, BondOrder::Double).is_aromatic);
    }

    #[test]
    fn effective_order_prefers_fractional_order() {
        let aromatic = Bond::new(0, 1, BondOrder::Aromatic);
        assert_eq!(aromatic.effective_order(), 1.5);
        assert_eq!(Bond::new(0, 1, BondOrder::Triple).effective_order(), 3.0);
        assert_eq!(aromatic.with_fractional_order(1.42).effective_order(), 1.42);
    }

    #[test]
    fn other_returns_opposite_endpoint() {
        let bond = Bond::new(3, 7, BondOrder::Single);
        assert_eq!(bond.other(3), Some(7));
        assert_eq!(bond.other(7), Some(3));
        assert_eq!(bond.other(5), None);
        assert!(bond.contains(7));
        assert!(!bond.contains(4));
    }

    #[test]
    fn sorted_pair_orders_endpoints() {
        assert_eq!(Bond::new(5, 2, BondOrder::Single).sorted_pair(), (2, 5));
        assert_eq!(Bond::new(2, 5, BondOrder::Single).sorted_pair(), (2, 5));
    }
}
