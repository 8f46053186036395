use super::{Aggregates, Query, Wide};
use crate::{nodes::MinNode, Infinity};

#[derive(Debug)]
pub struct MinQuery;

impl Query for MinQuery {
    type Output = MinNode<Wide>;

    fn identity() -> MinNode<Wide> {
        MinNode::infinity()
    }
    fn read(node: &Aggregates) -> MinNode<Wide> {
        node.min.into()
    }
    fn combine(left: MinNode<Wide>, right: MinNode<Wide>) -> MinNode<Wide> {
        if left < right {
            left
        } else {
            right
        }
    }
}
