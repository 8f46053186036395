use super::{Aggregates, Query, Wide};
use crate::{nodes::MaxNode, NegativeInfinity};

#[derive(Debug)]
pub struct MaxQuery;

impl Query for MaxQuery {
    type Output = MaxNode<Wide>;

    fn identity() -> MaxNode<Wide> {
        MaxNode::negative_infinity()
    }
    fn read(node: &Aggregates) -> MaxNode<Wide> {
        node.max.into()
    }
    fn combine(left: MaxNode<Wide>, right: MaxNode<Wide>) -> MaxNode<Wide> {
        if left < right {
            right
        } else {
            left
        }
    }
}
