//! Range sum/min/max queries and range-add updates over a fixed array.
//!
//! [`LazyTree`] defers range updates in a per-node ledger and answers every
//! query and update in `O(log N)`. [`EagerTree`] applies updates element by
//! element and exists as a baseline to compare against.
//!
//! Neither tree synchronizes access. Queries on a [`LazyTree`] mutate its
//! ledger, so concurrent callers need one exclusive lock for reads and writes.

mod eager_tree;
mod error;
mod lazy_tree;
mod nodes;
mod query;
mod range_aggregate;
mod traits;
mod tree;

pub use eager_tree::EagerTree;
pub use error::{Error, Result};
pub use lazy_tree::LazyTree;
pub use range_aggregate::RangeAggregate;
pub use tree::Layout;
use traits::{Infinity, NegativeInfinity, Zero};
use tree::Span;

/// An element of the array.
pub type Value = i64;

/// Sums and pending deltas. Any sum of `Value`s that fits in memory fits in a
/// `Wide`, so sums never wrap.
pub type Wide = i128;

// narrows a min/max result back to an element; the bound is always present
// and in range for a validated, non-empty span
fn narrow(bound: Option<Wide>, span: Span) -> Result<Value> {
    bound
        .and_then(|value| Value::try_from(value).ok())
        .ok_or(Error::Overflow {
            l: span.lo,
            r: span.hi,
        })
}
