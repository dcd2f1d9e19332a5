//! Attribute storage shared by every game object.
//!
//! Attributes are plain named numbers. Names ending in `/Current` and
//! `/Total` form a resource pool (`HP/Current`, `HP/Total`) and every write
//! keeps `0 <= Current <= Total`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::Scalar;

pub const CURRENT: &str = "/Current";
pub const TOTAL: &str = "/Total";

/// Formulas may read other derived attributes up to this depth.
const MAX_FORMULA_DEPTH: usize = 8;

pub fn current_of(resource: &str) -> String {
    format!("{resource}{CURRENT}")
}

pub fn total_of(resource: &str) -> String {
    format!("{resource}{TOTAL}")
}

/// `"HP/Current"` and `"HP/Total"` both belong to the resource `"HP"`.
pub fn resource_of(attribute: &str) -> Option<&str> {
    attribute
        .strip_suffix(CURRENT)
        .or_else(|| attribute.strip_suffix(TOTAL))
        .filter(|resource| !resource.is_empty())
}

/// Clamp a value about to be written to `attribute`.
///
/// `total` is asked for the matching `<R>/Total` when `attribute` is a
/// `<R>/Current`. The result is never negative.
pub fn clamp<T: Scalar>(attribute: &str, value: T, total: impl FnOnce(&str) -> T) -> T {
    let mut value = value;
    if let Some(resource) = attribute.strip_suffix(CURRENT) {
        let total = total(&total_of(resource));
        if value > total {
            value = total;
        }
    }
    if value < T::zero() { T::zero() } else { value }
}

/// Anything that carries attributes: characters, items, ...
///
/// `get`, `set` and `add` are the only way state changes, which is what keeps
/// resource pools inside their bounds.
pub trait Entity<T: Scalar> {
    fn name(&self) -> &str;

    /// Derived value if a formula is registered, else the stored value, else zero.
    fn get(&self, attribute: &str) -> T;

    /// Clamped write; see [`clamp`].
    fn set(&mut self, attribute: &str, value: T);

    /// Every attribute name known to this entity. Never creates entries.
    fn attributes(&self) -> BTreeSet<String>;

    fn add(&mut self, attribute: &str, delta: T) {
        let value = self.get(attribute) + delta;
        self.set(attribute, value);
    }

    fn has(&self, attribute: &str) -> bool {
        self.attributes().contains(attribute)
    }

    /// Base names of every `<R>/Current` or `<R>/Total` attribute.
    fn resources(&self) -> BTreeSet<String> {
        self.attributes()
            .iter()
            .filter_map(|attribute| resource_of(attribute))
            .map(str::to_owned)
            .collect()
    }

    fn alive(&self) -> bool {
        self.get("HP/Current") > T::zero()
    }

    fn able(&self) -> bool {
        self.alive()
    }

    fn defeated(&self) -> bool {
        !self.alive()
    }
}

/// A computed attribute. Stored next to plain values and shadows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formula<T> {
    /// `offset + Σ factor * attribute`
    Linear { offset: T, terms: Vec<Term<T>> },
    /// One if `attribute > threshold`, zero otherwise.
    Above { attribute: String, threshold: T },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term<T> {
    pub attribute: String,
    pub factor: T,
}

impl<T: Scalar> Formula<T> {
    pub fn constant(value: T) -> Self {
        Formula::Linear {
            offset: value,
            terms: Vec::new(),
        }
    }

    pub fn linear<'a>(offset: T, terms: impl IntoIterator<Item = (&'a str, T)>) -> Self {
        Formula::Linear {
            offset,
            terms: terms
                .into_iter()
                .map(|(attribute, factor)| Term {
                    attribute: attribute.to_string(),
                    factor,
                })
                .collect(),
        }
    }

    pub fn above(attribute: &str, threshold: T) -> Self {
        Formula::Above {
            attribute: attribute.to_string(),
            threshold,
        }
    }

    pub fn evaluate(&self, lookup: impl Fn(&str) -> T) -> T {
        match self {
            Formula::Linear { offset, terms } => terms
                .iter()
                .fold(*offset, |acc, term| acc + lookup(&term.attribute) * term.factor),
            Formula::Above {
                attribute,
                threshold,
            } => {
                if lookup(attribute) > *threshold {
                    T::one()
                } else {
                    T::zero()
                }
            }
        }
    }
}

/// Stored and derived attributes of one object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sheet<T> {
    #[serde(default)]
    attributes: BTreeMap<String, T>,
    #[serde(default)]
    derived: BTreeMap<String, Formula<T>>,
}

impl<T: Scalar> Sheet<T> {
    pub fn new() -> Self {
        Self {
            attributes: BTreeMap::new(),
            derived: BTreeMap::new(),
        }
    }

    /// Builder: seed a stored value without clamping.
    pub fn with(mut self, attribute: &str, value: T) -> Self {
        self.attributes.insert(attribute.to_string(), value);
        self
    }

    /// Builder: register a formula.
    pub fn derive(mut self, attribute: &str, formula: Formula<T>) -> Self {
        self.derived.insert(attribute.to_string(), formula);
        self
    }

    pub fn formula(&self, attribute: &str) -> Option<&Formula<T>> {
        self.derived.get(attribute)
    }

    pub fn stored(&self, attribute: &str) -> Option<T> {
        self.attributes.get(attribute).copied()
    }

    pub fn get(&self, attribute: &str) -> T {
        self.resolve(attribute, 0)
    }

    fn resolve(&self, attribute: &str, depth: usize) -> T {
        if depth < MAX_FORMULA_DEPTH {
            if let Some(formula) = self.derived.get(attribute) {
                return formula.evaluate(|name| self.resolve(name, depth + 1));
            }
        }
        self.stored(attribute).unwrap_or_else(T::zero)
    }

    pub fn set(&mut self, attribute: &str, value: T) {
        let value = clamp(attribute, value, |total| self.get(total));
        self.write(attribute, value);
        // any other write may feed a derived Total
        if !attribute.ends_with(CURRENT) {
            self.settle();
        }
    }

    /// Pull every stored `<R>/Current` back inside `0..=<R>/Total`.
    fn settle(&mut self) {
        let pools: Vec<String> = self
            .attributes
            .keys()
            .filter(|attribute| attribute.ends_with(CURRENT))
            .cloned()
            .collect();
        for current in pools {
            let value = clamp(&current, self.get(&current), |total| self.get(total));
            self.write(&current, value);
        }
    }

    pub fn add(&mut self, attribute: &str, delta: T) {
        let value = self.get(attribute) + delta;
        self.set(attribute, value);
    }

    /// Raw write; callers are responsible for clamping.
    pub(crate) fn write(&mut self, attribute: &str, value: T) {
        self.attributes.insert(attribute.to_string(), value);
    }

    pub fn keys(&self) -> BTreeSet<String> {
        self.attributes
            .keys()
            .chain(self.derived.keys())
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.attributes.iter()
    }
}
