use super::{LazyTree, Result, Span, Value, Wide, ROOT};
use crate::{
    nodes::fits_after_shift,
    query::{MaxQuery, MinQuery},
    tree, Error,
};

impl LazyTree {
    /// Adds `delta` to every element in `[l, r]`.
    ///
    /// Fails with [`Error::Overflow`] if any element in the range would leave
    /// the `Value` range. The tree is unchanged in that case.
    pub fn update(&mut self, l: usize, r: usize, delta: Value) -> Result<()> {
        let target = Span::checked(l, r, self.leaf_count)?;
        log::trace!("update [{l}, {r}] by {delta}");
        if delta == 0 {
            return Ok(());
        }
        self.check_shift(target, delta)?;
        self.update_node(ROOT, self.span(), target, Wide::from(delta));
        Ok(())
    }

    fn check_shift(&self, target: Span, delta: Value) -> Result<()> {
        let min = self.peek_node::<MinQuery>(ROOT, self.span(), target, 0);
        let max = self.peek_node::<MaxQuery>(ROOT, self.span(), target, 0);
        if fits_after_shift(min.into(), max.into(), delta) {
            Ok(())
        } else {
            log::debug!(
                "rejected update of [{}, {}] by {delta}: elements would overflow",
                target.lo,
                target.hi
            );
            Err(Error::Overflow {
                l: target.lo,
                r: target.hi,
            })
        }
    }

    fn update_node(&mut self, node: usize, span: Span, target: Span, delta: Wide) {
        if !span.overlaps(target) {
            return;
        }
        self.push(node, span);
        if span.contained_in(target) {
            self.nodes[node].shift(delta, span.width());
            if !span.is_leaf() {
                self.defer_to_children(node, span, delta);
            }
            return;
        }
        let (left, right) = tree::children(node);
        let (left_span, right_span) = span.halves();
        self.update_node(left, left_span, target, delta);
        self.update_node(right, right_span, target, delta);
        self.recombine(node, span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_partial_updates() {
        let mut tree = LazyTree::build(&[1, 2, 3, 4, 5]).unwrap();
        tree.update(0, 2, 5).unwrap();
        tree.update(1, 3, -2).unwrap();
        assert_eq!(tree.to_vec(), Ok(vec![6, 5, 6, 2, 5]));
        assert_eq!(tree.query_sum(0, 4), Ok(24));
        assert_eq!(tree.query_min(0, 4), Ok(2));
        assert_eq!(tree.query_max(0, 4), Ok(6));
    }

    #[test]
    fn updates_compose() {
        let elements = [9, -4, 0, 17, 3, 3, -12, 8];
        let mut twice = LazyTree::build(&elements).unwrap();
        twice.update(2, 6, 7).unwrap();
        twice.update(2, 6, -3).unwrap();
        let mut once = LazyTree::build(&elements).unwrap();
        once.update(2, 6, 4).unwrap();
        for (l, r) in [(0, 7), (2, 6), (1, 3), (5, 7), (4, 4)] {
            assert_eq!(twice.query_sum(l, r), once.query_sum(l, r));
            assert_eq!(twice.query_min(l, r), once.query_min(l, r));
            assert_eq!(twice.query_max(l, r), once.query_max(l, r));
        }
    }

    #[test]
    fn disjoint_ranges_are_unaffected() {
        let mut tree = LazyTree::build(&[1, 2, 3, 4, 5]).unwrap();
        let before = tree.query_sum(3, 4).unwrap();
        tree.update(0, 1, 100).unwrap();
        assert_eq!(tree.query_sum(3, 4), Ok(before));
        assert_eq!(tree.query_max(3, 4), Ok(5));
        assert_eq!(tree.query_max(0, 4), Ok(102));
    }

    #[test]
    fn single_element_tree() {
        let mut tree = LazyTree::build(&[-6]).unwrap();
        assert_eq!(tree.query_sum(0, 0), Ok(-6));
        assert_eq!(tree.query_min(0, 0), Ok(-6));
        assert_eq!(tree.query_max(0, 0), Ok(-6));
        tree.update(0, 0, 10).unwrap();
        assert_eq!(tree.get(0), Ok(4));
        assert_eq!(tree.query_sum(0, 0), Ok(4));
        assert_eq!(tree.query_min(0, 0), Ok(4));
        assert_eq!(tree.query_max(0, 0), Ok(4));
    }

    #[test]
    fn zero_delta_still_validates() {
        let mut tree = LazyTree::build(&[1, 2]).unwrap();
        assert!(tree.update(0, 1, 0).is_ok());
        assert_eq!(
            tree.update(1, 2, 0),
            Err(Error::InvalidRange { l: 1, r: 2, len: 2 })
        );
    }

    #[test]
    fn sums_widen_past_i64() {
        let mut tree = LazyTree::build(&[Value::MAX, Value::MAX, Value::MAX]).unwrap();
        assert_eq!(tree.query_sum(0, 2), Ok(3 * Wide::from(Value::MAX)));
        tree.update(0, 2, Value::MIN).unwrap();
        assert_eq!(tree.query_sum(0, 2), Ok(-3));
        assert_eq!(tree.query_max(0, 2), Ok(-1));
    }

    #[test]
    fn overflowing_update_is_rejected_without_side_effects() {
        let mut tree = LazyTree::build(&[0, Value::MAX - 5, 3, Value::MIN + 1]).unwrap();
        tree.update(0, 2, 2).unwrap();
        let (nodes, pending) = (tree.nodes.clone(), tree.pending.clone());

        assert_eq!(tree.update(1, 2, 4), Err(Error::Overflow { l: 1, r: 2 }));
        assert_eq!(tree.update(2, 3, -2), Err(Error::Overflow { l: 2, r: 3 }));
        assert_eq!(tree.nodes, nodes);
        assert_eq!(tree.pending, pending);

        tree.update(1, 2, 3).unwrap();
        assert_eq!(tree.query_max(0, 3), Ok(Value::MAX));
        tree.update(3, 3, -1).unwrap();
        assert_eq!(tree.query_min(0, 3), Ok(Value::MIN));
    }
}
