// MinNode/MaxNode give the min and max queries an identity element.
// None plays the role of +inf (min) or -inf (max), so no real
// element value has to double as a sentinel

use super::{Infinity, NegativeInfinity, Value, Wide};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinNode<V>(Option<V>);

impl<V> Infinity for MinNode<V> {
    fn infinity() -> Self {
        MinNode(None)
    }
}

// unlike Option's own ordering, None (+inf) sorts above every value
impl<V: PartialOrd> PartialOrd for MinNode<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.0, &other.0) {
            (None, None) => Some(Ordering::Equal),
            (Some(lhs), Some(rhs)) => lhs.partial_cmp(rhs),
            (None, Some(_)) => Some(Ordering::Greater),
            (Some(_), None) => Some(Ordering::Less),
        }
    }
}

impl<V> From<MinNode<V>> for Option<V> {
    fn from(value: MinNode<V>) -> Self {
        value.0
    }
}

impl<V> From<V> for MinNode<V> {
    fn from(value: V) -> Self {
        MinNode(Some(value))
    }
}

// Option already orders None (-inf) below every value
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MaxNode<V>(Option<V>);

impl<V> NegativeInfinity for MaxNode<V> {
    fn negative_infinity() -> Self {
        MaxNode(None)
    }
}

impl<V> From<MaxNode<V>> for Option<V> {
    fn from(value: MaxNode<V>) -> Self {
        value.0
    }
}

impl<V> From<V> for MaxNode<V> {
    fn from(value: V) -> Self {
        MaxNode(Some(value))
    }
}

/// The cached sum, min and max of one node's range.
///
/// Each aggregate is combined and shifted by its own rule; none of
/// them may stand in for another outside of a leaf.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    pub sum: Wide,
    pub min: Wide,
    pub max: Wide,
}

impl Aggregates {
    pub fn leaf(value: Value) -> Self {
        let value = Wide::from(value);
        Self {
            sum: value,
            min: value,
            max: value,
        }
    }

    pub fn combine(left: &Self, right: &Self) -> Self {
        Self {
            sum: left.sum + right.sum,
            min: left.min.min(right.min),
            max: left.max.max(right.max),
        }
    }

    /// Adds `delta` to each of the `width` elements below this node.
    pub fn shift(&mut self, delta: Wide, width: usize) {
        self.sum += delta * width as Wide;
        self.min += delta;
        self.max += delta;
    }

    pub fn shifted(mut self, delta: Wide, width: usize) -> Self {
        self.shift(delta, width);
        self
    }
}

// whether every element in [min, max] still fits in a Value after adding delta
pub fn fits_after_shift(min: Option<Wide>, max: Option<Wide>, delta: Value) -> bool {
    let delta = Wide::from(delta);
    let fits = |bound: Option<Wide>| bound.map_or(true, |v| Value::try_from(v + delta).is_ok());
    fits(min) && fits(max)
}
