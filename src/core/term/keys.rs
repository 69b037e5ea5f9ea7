//! Per-group child-map keys.
//!
//! When a term is inserted into a composite parent, the key it lands under
//! decides what it can combine with:
//!
//! - into CB (product): the *base hash*, with power and multiplier excluded,
//!   so `x^2` and `x^3` collide and their powers add;
//! - into CP (sum): the *content hash*, with power included and multiplier
//!   excluded, so `3x` and `5x` collide and their coefficients add, while
//!   numerics all collide on the constant sentinel;
//! - into PL: the stringified power, grouping same-base terms by exponent.

use crate::core::display;
use crate::core::settings::Settings;
use crate::core::term::{Group, Power, Term};

impl Term {
    /// Canonical text with power and multiplier excluded.
    pub(crate) fn base_hash(&self) -> String {
        display::bare_text(self)
    }

    /// Canonical text with multiplier excluded. Numerics hash to the
    /// configured constant sentinel so that any two of them collide.
    pub(crate) fn content_hash(&self, settings: &Settings) -> String {
        if self.group == Group::N {
            settings.const_hash.clone()
        } else {
            display::content_text(self)
        }
    }

    /// The key this term inserts under in a parent of the given group.
    pub fn key_for_group(&self, parent: Group, settings: &Settings) -> String {
        match parent {
            Group::CB => self.base_hash(),
            Group::PL => match &self.power {
                Power::Rat(r) => r.to_string(),
                Power::Term(t) => t.text(),
            },
            _ => self.content_hash(settings),
        }
    }
}
