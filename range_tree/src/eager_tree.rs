use super::{
    narrow,
    nodes::{fits_after_shift, Aggregates},
    query::{MaxQuery, MinQuery, Query, SumQuery},
    tree::{self, Layout, Span, ROOT},
    Error, RangeAggregate, Result, Value, Wide,
};
use serde::{Deserialize, Serialize};

/// Range sum/min/max tree without deferred updates.
///
/// Point assignments recombine the leaf's ancestors right away. A range add
/// is one point update per element, so it costs `O(k log N)` for `k` elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "EagerTreeParts")]
pub struct EagerTree {
    nodes: Vec<Aggregates>,
    leaf_count: usize,
    layout: Layout,
}

#[derive(Deserialize)]
struct EagerTreeParts {
    nodes: Vec<Aggregates>,
    leaf_count: usize,
    layout: Layout,
}

impl TryFrom<EagerTreeParts> for EagerTree {
    type Error = Error;

    fn try_from(parts: EagerTreeParts) -> Result<Self> {
        tree::check_table(&parts.nodes, None, parts.leaf_count, parts.layout)?;
        Ok(Self {
            nodes: parts.nodes,
            leaf_count: parts.leaf_count,
            layout: parts.layout,
        })
    }
}

impl EagerTree {
    pub fn build(elements: &[Value]) -> Result<Self> {
        Self::build_with(elements, Layout::default())
    }

    pub fn build_with(elements: &[Value], layout: Layout) -> Result<Self> {
        Ok(Self {
            nodes: tree::build_table(elements, layout)?,
            leaf_count: elements.len(),
            layout,
        })
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn span(&self) -> Span {
        Span::whole(self.leaf_count)
    }

    // assumes index < leaf_count
    fn leaf_of(&self, index: usize) -> usize {
        let mut node = ROOT;
        let mut span = self.span();
        while !span.is_leaf() {
            let (left, right) = tree::children(node);
            let (left_span, right_span) = span.halves();
            (node, span) = if index <= left_span.hi {
                (left, left_span)
            } else {
                (right, right_span)
            };
        }
        node
    }

    pub fn get(&self, index: usize) -> Result<Value> {
        tree::check_index(index, self.leaf_count)?;
        let leaf = self.leaf_of(index);
        narrow(Some(self.nodes[leaf].sum), Span::new(index, index))
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        tree::check_index(index, self.leaf_count)?;
        log::trace!("set {index} to {value}");
        let leaf = self.leaf_of(index);
        self.nodes[leaf] = Aggregates::leaf(value);
        self.update_ancestors(leaf);
        Ok(())
    }

    /// Adds `delta` to every element in `[l, r]`, one element at a time.
    pub fn add(&mut self, l: usize, r: usize, delta: Value) -> Result<()> {
        let target = Span::checked(l, r, self.leaf_count)?;
        log::trace!("add {delta} to [{l}, {r}]");
        if delta == 0 {
            return Ok(());
        }
        let min = self.query_node::<MinQuery>(ROOT, self.span(), target);
        let max = self.query_node::<MaxQuery>(ROOT, self.span(), target);
        if !fits_after_shift(min.into(), max.into(), delta) {
            log::debug!("rejected add of {delta} to [{l}, {r}]: elements would overflow");
            return Err(Error::Overflow { l, r });
        }
        for index in l..=r {
            let leaf = self.leaf_of(index);
            self.nodes[leaf].shift(Wide::from(delta), 1);
            self.update_ancestors(leaf);
        }
        Ok(())
    }

    fn update_ancestors(&mut self, mut node: usize) {
        while let Some(parent) = tree::parent(node) {
            let (left, right) = tree::children(parent);
            self.nodes[parent] = Aggregates::combine(&self.nodes[left], &self.nodes[right]);
            node = parent;
        }
    }

    pub fn query_sum(&self, l: usize, r: usize) -> Result<Wide> {
        let target = Span::checked(l, r, self.leaf_count)?;
        log::trace!("query_sum [{l}, {r}]");
        Ok(self.query_node::<SumQuery>(ROOT, self.span(), target))
    }

    pub fn query_min(&self, l: usize, r: usize) -> Result<Value> {
        let target = Span::checked(l, r, self.leaf_count)?;
        log::trace!("query_min [{l}, {r}]");
        narrow(
            self.query_node::<MinQuery>(ROOT, self.span(), target).into(),
            target,
        )
    }

    pub fn query_max(&self, l: usize, r: usize) -> Result<Value> {
        let target = Span::checked(l, r, self.leaf_count)?;
        log::trace!("query_max [{l}, {r}]");
        narrow(
            self.query_node::<MaxQuery>(ROOT, self.span(), target).into(),
            target,
        )
    }

    fn query_node<Q: Query>(&self, node: usize, span: Span, target: Span) -> Q::Output {
        if !span.overlaps(target) {
            return Q::identity();
        }
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
}

impl RangeAggregate for EagerTree {
    fn leaf_count(&self) -> usize {
        EagerTree::leaf_count(self)
    }

    fn get(&self, index: usize) -> Result<Value> {
        EagerTree::get(self, index)
    }

    fn query_sum(&mut self, l: usize, r: usize) -> Result<Wide> {
        EagerTree::query_sum(self, l, r)
    }

    fn query_min(&mut self, l: usize, r: usize) -> Result<Value> {
        EagerTree::query_min(self, l, r)
    }

    fn query_max(&mut self, l: usize, r: usize) -> Result<Value> {
        EagerTree::query_max(self, l, r)
    }

    fn update(&mut self, l: usize, r: usize, delta: Value) -> Result<()> {
        self.add(l, r, delta)
    }
}
