//! The canonical symbolic term type.
//!
//! A [`Term`] is a single algebraic value: a rational multiplier, a power
//! (rational, or another term for symbolic exponents), an identity-hash
//! string, and, for the composite groups, a child map keyed by a
//! deterministic per-group hash. The [`Group`] tag decides which fields are
//! meaningful and how the term keys into a parent's child map.
//!
//! Terms are value-typed: the kernel clones its inputs before mutating, and
//! ownership forms a strict tree (a term's power may itself be a term, but
//! recursion is by ownership and acyclic). `Clone` is therefore deep by
//! derivation.

mod analysis;
mod keys;
mod operators;

use std::collections::BTreeMap;

use crate::core::frac::Frac;

/// Atom names treated as named constants rather than free variables.
pub(crate) const NAMED_CONSTANTS: &[&str] = &["pi", "e"];

/// Structural shape of a term. The tag fixes which fields are active and
/// how children hash into a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// Pure numeric constant; all information lives in the multiplier.
    N,
    /// Integer raised to a non-integer rational power, e.g. `2^(1/2)`.
    P,
    /// Symbolic atom: a variable or a named constant such as `pi`.
    S,
    /// Term whose exponent is itself a term.
    EX,
    /// Function application.
    FN,
    /// Power-list: sum of terms sharing a base, keyed by power.
    PL,
    /// Composite polynomial: general sum, keyed by content hash.
    CP,
    /// Combination: product of terms, keyed by base hash.
    CB,
}

impl Group {
    /// True for the groups that carry a child map.
    #[inline]
    pub fn is_composite(self) -> bool {
        matches!(self, Group::PL | Group::CP | Group::CB)
    }
}

/// A term's exponent: rational for every group except EX, where the
/// exponent is another term.
#[derive(Debug, Clone, PartialEq, Hash)]
pub enum Power {
    /// Rational exponent (all groups except EX).
    Rat(Frac),
    /// Symbolic exponent (group EX only).
    Term(Box<Term>),
}

impl Power {
    /// The rational exponent, when this is not a symbolic power.
    #[inline]
    pub fn as_rat(&self) -> Option<&Frac> {
        match self {
            Power::Rat(r) => Some(r),
            Power::Term(_) => None,
        }
    }

    /// The symbolic exponent, when this is one.
    #[inline]
    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Power::Rat(_) => None,
            Power::Term(t) => Some(t),
        }
    }

    /// True when the exponent is exactly the rational 1.
    pub fn is_one(&self) -> bool {
        matches!(self, Power::Rat(r) if r.is_one())
    }
}

impl From<Frac> for Power {
    fn from(r: Frac) -> Self {
        Power::Rat(r)
    }
}

/// A canonical symbolic term.
///
/// See the module docs for the representation contract; the arithmetic
/// kernel in [`crate::kernel`] is the only code that mutates terms, and it
/// restores every invariant before returning.
#[derive(Debug, Clone)]
pub struct Term {
    /// Structural group tag.
    pub(crate) group: Group,
    /// Identity hash. For atoms this is the name (or integer base); for
    /// composites it is derived from the children by [`Term::update_hash`].
    pub(crate) value: String,
    /// Rational coefficient out front.
    pub(crate) multiplier: Frac,
    /// Exponent; rational except for group EX.
    pub(crate) power: Power,
    /// Group held before promotion to EX; restored on demotion.
    pub(crate) previous_group: Option<Group>,
    /// Function name (FN only).
    pub(crate) fname: String,
    /// Ordered function arguments (FN only).
    pub(crate) args: Vec<Term>,
    /// Child map for composite groups, keyed per [`Term::key_for_group`].
    pub(crate) children: BTreeMap<String, Term>,
    /// Marks the imaginary unit.
    pub(crate) imaginary: bool,
    /// Marks the distinguished infinity.
    pub(crate) infinite: bool,
    /// Marks a unit-of-measure atom.
    pub(crate) unit: bool,
}

impl Term {
    pub(crate) fn blank(group: Group, value: String) -> Self {
        Term {
            group,
            value,
            multiplier: Frac::one(),
            power: Power::Rat(Frac::one()),
            previous_group: None,
            fname: String::new(),
            args: Vec::new(),
            children: BTreeMap::new(),
            imaginary: false,
            infinite: false,
            unit: false,
        }
    }

    /// The numeric zero.
    pub fn zero() -> Self {
        Term::number(Frac::zero())
    }

    /// The numeric one.
    pub fn one() -> Self {
        Term::number(Frac::one())
    }

    /// A pure numeric term carrying `value` in its multiplier.
    pub fn number(value: Frac) -> Self {
        let mut t = Term::blank(Group::N, crate::core::settings::DEFAULT_CONST_HASH.into());
        t.multiplier = value;
        t
    }

    /// A numeric term from a machine integer.
    pub fn int(value: i64) -> Self {
        Term::number(Frac::from(value))
    }

    /// A symbolic atom (variable or named constant).
    pub fn variable(name: impl Into<String>) -> Self {
        Term::blank(Group::S, name.into())
    }

    /// The imaginary unit atom.
    pub fn imaginary_unit(name: impl Into<String>) -> Self {
        let mut t = Term::variable(name);
        t.imaginary = true;
        t
    }

    /// The distinguished infinity.
    pub fn infinity() -> Self {
        let mut t = Term::number(Frac::infinity());
        t.infinite = true;
        t
    }

    /// A unit-of-measure atom. Units take no part in arithmetic folding.
    pub fn unit_atom(name: impl Into<String>) -> Self {
        let mut t = Term::variable(name);
        t.unit = true;
        t
    }

    /// A function application over ordered arguments.
    pub fn function(name: impl Into<String>, args: Vec<Term>) -> Self {
        let name = name.into();
        let mut t = Term::blank(Group::FN, String::new());
        t.fname = name;
        t.args = args;
        t.update_hash();
        t
    }

    /// A group-P radical: `base^power` with a non-integer rational power.
    pub(crate) fn surd(base: num_bigint::BigInt, power: Frac) -> Self {
        let mut t = Term::blank(Group::P, base.to_string());
        t.power = Power::Rat(power);
        t
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The structural group tag.
    #[inline]
    pub fn group(&self) -> Group {
        self.group
    }

    /// The identity hash.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The rational coefficient.
    #[inline]
    pub fn multiplier(&self) -> &Frac {
        &self.multiplier
    }

    /// The exponent.
    #[inline]
    pub fn power(&self) -> &Power {
        &self.power
    }

    /// The group held before promotion to EX, if any.
    #[inline]
    pub fn previous_group(&self) -> Option<Group> {
        self.previous_group
    }

    /// The function name (empty unless group FN).
    #[inline]
    pub fn fname(&self) -> &str {
        &self.fname
    }

    /// Function arguments (empty unless group FN).
    #[inline]
    pub fn args(&self) -> &[Term] {
        &self.args
    }

    /// The child map (empty unless composite or a promoted EX).
    #[inline]
    pub fn children(&self) -> &BTreeMap<String, Term> {
        &self.children
    }

    /// Number of children.
    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True when the child map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The rational exponent, defaulting symbolic powers to `None`.
    #[inline]
    pub fn rational_power(&self) -> Option<&Frac> {
        self.power.as_rat()
    }

    // -------------------------------------------------------------------------
    // Hash maintenance
    // -------------------------------------------------------------------------

    /// Recompute the identity hash after children or arguments mutate.
    ///
    /// For FN the value is `fname(arg,arg,...)`; for composites it is the
    /// canonical bare text (multiplier and head power excluded).
    pub(crate) fn update_hash(&mut self) {
        match self.group {
            Group::FN => {
                let args: Vec<String> = self.args.iter().map(Term::text).collect();
                self.value = format!("{}({})", self.fname, args.join(","));
            }
            Group::CP => {
                self.value = format!("({})", crate::core::display::join_sum(&self.children));
            }
            Group::CB => {
                self.value = crate::core::display::join_product(&self.children);
            }
            // A power-list keeps the shared base name in `value`; atom
            // hashes never depend on children, and a promoted EX keeps the
            // hash of its base.
            Group::N | Group::P | Group::S | Group::EX | Group::PL => {}
        }
    }

    /// Canonical text form of this term.
    pub fn text(&self) -> String {
        crate::core::display::term_text(self)
    }
}

// Structural equality: group, multiplier, power, and the group-dependent
// identity (children key-wise for composites, name+args for FN, value for
// atoms). Numeric terms carry no information in `value`, and
// `previous_group` and the marker flags are bookkeeping, not identity.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        if self.group != other.group
            || self.multiplier != other.multiplier
            || self.power != other.power
        {
            return false;
        }
        match self.group {
            Group::N => true,
            Group::FN => self.fname == other.fname && self.args == other.args,
            Group::PL | Group::CP | Group::CB => self.children == other.children,
            Group::EX => self.value == other.value && self.children == other.children,
            Group::P | Group::S => self.value == other.value,
        }
    }
}

impl Eq for Term {}

impl std::hash::Hash for Term {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.group).hash(state);
        self.multiplier.hash(state);
        self.power.hash(state);
        match self.group {
            Group::N => {}
            Group::FN => {
                self.fname.hash(state);
                self.args.hash(state);
            }
            Group::PL | Group::CP | Group::CB | Group::EX => {
                self.children.len().hash(state);
                for (key, child) in &self.children {
                    key.hash(state);
                    child.hash(state);
                }
                if self.group == Group::EX {
                    self.value.hash(state);
                }
            }
            Group::P | Group::S => self.value.hash(state),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}
