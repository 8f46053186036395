mod max_query;
mod min_query;
mod sum_query;

use super::{nodes::Aggregates, Wide};
pub use max_query::MaxQuery;
pub use min_query::MinQuery;
pub use sum_query::SumQuery;

/// One aggregate kind: which cached value it reads off a node, how two
/// partial results combine, and what a range with no elements yields.
pub trait Query {
    type Output: Copy;

    fn identity() -> Self::Output;
    fn read(node: &Aggregates) -> Self::Output;
    fn combine(left: Self::Output, right: Self::Output) -> Self::Output;

    // reads a node as if `delta` had already been added to all `width` elements below it
    fn read_shifted(node: &Aggregates, delta: Wide, width: usize) -> Self::Output {
        Self::read(&node.shifted(delta, width))
    }
}
