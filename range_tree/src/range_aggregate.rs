use super::{Result, Value, Wide};

/// Range queries and range-add updates over a fixed-length array.
///
/// All ranges are inclusive and must satisfy `l <= r < leaf_count()`.
/// A rejected call leaves the structure exactly as it was.
pub trait RangeAggregate {
    fn leaf_count(&self) -> usize;

    /// The current value at `index`, with every update applied.
    fn get(&self, index: usize) -> Result<Value>;

    fn query_sum(&mut self, l: usize, r: usize) -> Result<Wide>;
    fn query_min(&mut self, l: usize, r: usize) -> Result<Value>;
    fn query_max(&mut self, l: usize, r: usize) -> Result<Value>;

    /// Adds `delta` to every element in `[l, r]`.
    fn update(&mut self, l: usize, r: usize, delta: Value) -> Result<()>;
}
