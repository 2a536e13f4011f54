use std::fmt;
use std::ops::{Add, AddAssign};

use crate::selector::{ComplexSelector, SimpleSelector};

/// CSS specificity as a triple `(a, b, c)`:
///   - `a`: count of ID selectors
///   - `b`: count of class selectors, attribute selectors, and pseudo-classes
///   - `c`: count of type selectors and pseudo-elements
///
/// Ordered lexicographically, `a` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Specificity {
    pub const ZERO: Specificity = Specificity { a: 0, b: 0, c: 0 };

    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    /// Contribution of one simple selector.
    pub fn of_simple(simple: &SimpleSelector) -> Self {
        match simple {
            SimpleSelector::Id(_) => Self::new(1, 0, 0),
            SimpleSelector::Class(_)
            | SimpleSelector::Attribute { .. }
            | SimpleSelector::PseudoClass { .. } => Self::new(0, 1, 0),
            SimpleSelector::Type { .. } | SimpleSelector::PseudoElement { .. } => {
                Self::new(0, 0, 1)
            }
            SimpleSelector::Universal { .. } => Self::ZERO,
        }
    }
}

impl Add for Specificity {
    type Output = Specificity;

    fn add(self, other: Specificity) -> Specificity {
        Specificity {
            a: self.a.saturating_add(other.a),
            b: self.b.saturating_add(other.b),
            c: self.c.saturating_add(other.c),
        }
    }
}

impl AddAssign for Specificity {
    fn add_assign(&mut self, other: Specificity) {
        *self = *self + other;
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.a, self.b, self.c)
    }
}

/// Specificity of a parsed complex selector. Computed once at parse time.
pub fn specificity(selector: &ComplexSelector) -> Specificity {
    selector.specificity()
}

/// Recompute specificity from the selector's simple selectors.
pub fn compute_specificity(selector: &ComplexSelector) -> Specificity {
    selector
        .steps()
        .flat_map(|step| step.compound.simples())
        .map(Specificity::of_simple)
        .fold(Specificity::ZERO, Add::add)
}
