use super::{Aggregates, Query, Wide};
use crate::Zero;

#[derive(Debug)]
pub struct SumQuery;

impl Query for SumQuery {
    type Output = Wide;

    fn identity() -> Wide {
        Wide::zero()
    }
    fn read(node: &Aggregates) -> Wide {
        node.sum
    }
    fn combine(left: Wide, right: Wide) -> Wide {
        left + right
    }
}
