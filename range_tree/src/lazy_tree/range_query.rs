use super::{tree, LazyTree, Result, Span, Value, Wide, ROOT};
use crate::{
    narrow,
    query::{MaxQuery, MinQuery, Query, SumQuery},
};

impl LazyTree {
    pub fn query_sum(&mut self, l: usize, r: usize) -> Result<Wide> {
        let target = Span::checked(l, r, self.leaf_count)?;
        log::trace!("query_sum [{l}, {r}]");
        Ok(self.query_node::<SumQuery>(ROOT, self.span(), target))
    }

    pub fn query_min(&mut self, l: usize, r: usize) -> Result<Value> {
        let target = Span::checked(l, r, self.leaf_count)?;
        log::trace!("query_min [{l}, {r}]");
        let min = self.query_node::<MinQuery>(ROOT, self.span(), target);
        narrow(min.into(), target)
    }

    pub fn query_max(&mut self, l: usize, r: usize) -> Result<Value> {
        let target = Span::checked(l, r, self.leaf_count)?;
        log::trace!("query_max [{l}, {r}]");
        let max = self.query_node::<MaxQuery>(ROOT, self.span(), target);
        narrow(max.into(), target)
    }

    /// Like [`LazyTree::query_sum`], but from a shared borrow: pending deltas
    /// are carried down the walk instead of being pushed.
    pub fn peek_sum(&self, l: usize, r: usize) -> Result<Wide> {
        let target = Span::checked(l, r, self.leaf_count)?;
        Ok(self.peek_node::<SumQuery>(ROOT, self.span(), target, 0))
    }

    pub fn peek_min(&self, l: usize, r: usize) -> Result<Value> {
        let target = Span::checked(l, r, self.leaf_count)?;
        let min = self.peek_node::<MinQuery>(ROOT, self.span(), target, 0);
        narrow(min.into(), target)
    }

    pub fn peek_max(&self, l: usize, r: usize) -> Result<Value> {
        let target = Span::checked(l, r, self.leaf_count)?;
        let max = self.peek_node::<MaxQuery>(ROOT, self.span(), target, 0);
        narrow(max.into(), target)
    }

    fn query_node<Q: Query>(&mut self, node: usize, span: Span, target: Span) -> Q::Output {
        if !span.overlaps(target) {
            return Q::identity();
        }
        self.push(node, span);
        if span.contained_in(target) {
            return Q::read(&self.nodes[node]);
        }
        let (left, right) = tree::children(node);
        let (left_span, right_span) = span.halves();
        Q::combine(
            self.query_node::<Q>(left, left_span, target),
            self.query_node::<Q>(right, right_span, target),
        )
    }

    pub(super) fn peek_node<Q: Query>(
        &self,
        node: usize,
        span: Span,
        target: Span,
        carried: Wide,
    ) -> Q::Output {
        if !span.overlaps(target) {
            return Q::identity();
        }
        let carried = carried + self.pending[node];
        if span.contained_in(target) {
            return Q::read_shifted(&self.nodes[node], carried, span.width());
        }
        let (left, right) = tree::children(node);
        let (left_span, right_span) = span.halves();
        Q::combine(
            self.peek_node::<Q>(left, left_span, target, carried),
            self.peek_node::<Q>(right, right_span, target, carried),
        )
    }
}
