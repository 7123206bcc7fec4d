//! Elemental affinities and resistance.

use serde::{Deserialize, Serialize};

/// Elemental affinity of an attack or a defender.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    #[default]
    Neutral,
    Fire,
    Water,
    Earth,
    Air,
    Light,
    Dark,
}

impl Element {
    /// The element this one is strong against on the wheel
    /// (Water > Fire > Air > Earth > Water).
    #[must_use]
    pub const fn counters(self) -> Option<Element> {
        match self {
            Element::Water => Some(Element::Fire),
            Element::Fire => Some(Element::Air),
            Element::Air => Some(Element::Earth),
            Element::Earth => Some(Element::Water),
            Element::Neutral | Element::Light | Element::Dark => None,
        }
    }
}

/// Decides whether a defender resists an attack element.
pub trait ElementInteractionRule {
    fn is_resistant(&self, attack: Element, defender: Element) -> bool;
}

/// Default rule: a defender resists its own element and the element it
/// counters on the wheel. Neutral attacks are never resisted.
#[derive(Clone, Copy, Debug, Default)]
pub struct ElementWheel;

impl ElementInteractionRule for ElementWheel {
    fn is_resistant(&self, attack: Element, defender: Element) -> bool {
        if attack == Element::Neutral {
            return false;
        }
        attack == defender || defender.counters() == Some(attack)
    }
}

/// Rule where nothing is ever resisted.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResistance;

impl ElementInteractionRule for NoResistance {
    fn is_resistant(&self, _attack: Element, _defender: Element) -> bool {
        false
    }
}
