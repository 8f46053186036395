mod ledger;
mod range_query;
mod range_update;

use super::{
    nodes::Aggregates,
    tree::{self, Layout, Span, ROOT},
    Error, RangeAggregate, Result, Value, Wide,
};
use serde::{Deserialize, Serialize};

/// Range sum/min/max tree with deferred range-add updates.
///
/// `pending[k]` is a delta owed to node `k` and to its whole subtree. It has
/// been applied to none of them yet. Leaves never hold a pending delta, because
/// a delta handed to a leaf goes straight into its aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LazyTreeParts")]
pub struct LazyTree {
    nodes: Vec<Aggregates>,
    pending: Vec<Wide>,
    leaf_count: usize,
    layout: Layout,
}

// a snapshot as it arrives, before any of the tree's invariants are checked
#[derive(Deserialize)]
struct LazyTreeParts {
    nodes: Vec<Aggregates>,
    pending: Vec<Wide>,
    leaf_count: usize,
    layout: Layout,
}

impl TryFrom<LazyTreeParts> for LazyTree {
    type Error = Error;

    fn try_from(parts: LazyTreeParts) -> Result<Self> {
        tree::check_table(
            &parts.nodes,
            Some(parts.pending.as_slice()),
            parts.leaf_count,
            parts.layout,
        )?;
        Ok(Self {
            nodes: parts.nodes,
            pending: parts.pending,
            leaf_count: parts.leaf_count,
            layout: parts.layout,
        })
    }
}

impl LazyTree {
    pub fn build(elements: &[Value]) -> Result<Self> {
        Self::build_with(elements, Layout::default())
    }

    pub fn build_with(elements: &[Value], layout: Layout) -> Result<Self> {
        let nodes = tree::build_table(elements, layout)?;
        let pending = vec![0; nodes.len()];
        Ok(Self {
            nodes,
            pending,
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

    /// The current value at `index`.
    ///
    /// Adds up the pending deltas on the root-to-leaf path instead of pushing
    /// them, so the ledger is left untouched.
    pub fn get(&self, index: usize) -> Result<Value> {
        tree::check_index(index, self.leaf_count)?;
        let mut node = ROOT;
        let mut span = self.span();
        let mut carried = 0;
        loop {
            carried += self.pending[node];
            if span.is_leaf() {
                let value = self.nodes[node].sum + carried;
                return super::narrow(Some(value), span);
            }
            let (left, right) = tree::children(node);
            let (left_span, right_span) = span.halves();
            (node, span) = if index <= left_span.hi {
                (left, left_span)
            } else {
                (right, right_span)
            };
        }
    }

    /// The current values of all elements, in order.
    pub fn to_vec(&self) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(self.leaf_count);
        self.collect(ROOT, self.span(), 0, &mut values)?;
        Ok(values)
    }

    fn collect(
        &self,
        node: usize,
        span: Span,
        carried: Wide,
        values: &mut Vec<Value>,
    ) -> Result<()> {
        let carried = carried + self.pending[node];
        if span.is_leaf() {
            values.push(super::narrow(Some(self.nodes[node].sum + carried), span)?);
            return Ok(());
        }
        let (left, right) = tree::children(node);
        let (left_span, right_span) = span.halves();
        self.collect(left, left_span, carried, values)?;
        self.collect(right, right_span, carried, values)
    }
}

impl RangeAggregate for LazyTree {
    fn leaf_count(&self) -> usize {
        LazyTree::leaf_count(self)
    }

    fn get(&self, index: usize) -> Result<Value> {
        LazyTree::get(self, index)
    }

    fn query_sum(&mut self, l: usize, r: usize) -> Result<Wide> {
        LazyTree::query_sum(self, l, r)
    }

    fn query_min(&mut self, l: usize, r: usize) -> Result<Value> {
        LazyTree::query_min(self, l, r)
    }

    fn query_max(&mut self, l: usize, r: usize) -> Result<Value> {
        LazyTree::query_max(self, l, r)
    }

    fn update(&mut self, l: usize, r: usize, delta: Value) -> Result<()> {
        LazyTree::update(self, l, r, delta)
    }
}

impl TryFrom<Vec<Value>> for LazyTree {
    type Error = Error;

    fn try_from(elements: Vec<Value>) -> Result<Self> {
        Self::build(&elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_leaves_empty_ledger() {
        let tree = LazyTree::build(&[4, 8, 15, 16, 23, 42]).unwrap();
        assert!(tree.pending.iter().all(|&delta| delta == 0));
        assert_eq!(tree.nodes[ROOT].sum, 108);
        assert_eq!(tree.nodes[ROOT].min, 4);
        assert_eq!(tree.nodes[ROOT].max, 42);
    }

    #[test]
    fn build_rejects_empty_input() {
        assert_eq!(LazyTree::build(&[]).unwrap_err(), Error::EmptyInput);
        assert!(LazyTree::try_from(Vec::<Value>::new()).is_err());
    }

    #[test]
    fn layout_sizes_tables() {
        let elements = [1, 2, 3, 4, 5];
        let four_n = LazyTree::build_with(&elements, Layout::FourN).unwrap();
        let pow_two = LazyTree::build_with(&elements, Layout::PowerOfTwo).unwrap();
        assert_eq!(four_n.nodes.len(), 20);
        assert_eq!(pow_two.nodes.len(), 15);
        assert_eq!(pow_two.pending.len(), 15);
        assert_eq!(pow_two.layout(), Layout::PowerOfTwo);
    }

    #[test]
    fn get_reads_through_pending_deltas() {
        let mut tree = LazyTree::build(&[1, 2, 3, 4, 5]).unwrap();
        tree.update(0, 4, 10).unwrap();
        assert!(tree.pending.iter().any(|&delta| delta != 0));
        let pending = tree.pending.clone();
        assert_eq!(tree.get(3), Ok(14));
        assert_eq!(tree.to_vec(), Ok(vec![11, 12, 13, 14, 15]));
        assert_eq!(tree.pending, pending);
    }

    #[test]
    fn get_rejects_out_of_bounds() {
        let tree = LazyTree::build(&[7]).unwrap();
        assert_eq!(tree.get(0), Ok(7));
        assert_eq!(
            tree.get(1),
            Err(Error::IndexOutOfBounds { index: 1, len: 1 })
        );
    }

    // serializes like a LazyTree, but with any contents
    #[derive(Serialize)]
    struct Snapshot {
        nodes: Vec<Aggregates>,
        pending: Vec<Wide>,
        leaf_count: usize,
        layout: Layout,
    }

    fn restore(snapshot: &Snapshot) -> bincode::Result<LazyTree> {
        bincode::deserialize(&bincode::serialize(snapshot).unwrap())
    }

    #[test]
    fn snapshot_round_trip_keeps_pending_deltas() {
        let mut tree = LazyTree::build(&[3, 1, 4, 1, 5]).unwrap();
        tree.update(0, 4, 2).unwrap();
        tree.update(1, 2, -7).unwrap();
        let bytes = bincode::serialize(&tree).unwrap();
        let mut restored: LazyTree = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored.pending, tree.pending);
        assert_eq!(restored.to_vec(), Ok(vec![5, -4, -1, 3, 7]));
        assert_eq!(restored.query_sum(0, 4), Ok(10));
    }

    #[test]
    fn malformed_snapshots_are_rejected() {
        let empty = Snapshot {
            nodes: Vec::new(),
            pending: Vec::new(),
            leaf_count: 0,
            layout: Layout::FourN,
        };
        assert!(restore(&empty).is_err());

        let short_table = Snapshot {
            nodes: vec![Aggregates::leaf(1)],
            pending: vec![0],
            leaf_count: 5,
            layout: Layout::FourN,
        };
        assert!(restore(&short_table).is_err());

        let built = LazyTree::build_with(&[1, 2, 3], Layout::PowerOfTwo).unwrap();
        let from_built = |nodes: Vec<Aggregates>, pending: Vec<Wide>| Snapshot {
            nodes,
            pending,
            leaf_count: 3,
            layout: Layout::PowerOfTwo,
        };
        assert!(restore(&from_built(built.nodes.clone(), built.pending.clone())).is_ok());

        // slot 2 covers the leaf [2, 2]
        let mut leaf_owes = built.pending.clone();
        leaf_owes[2] = 4;
        assert!(restore(&from_built(built.nodes.clone(), leaf_owes)).is_err());

        let mut stale_root = built.nodes.clone();
        stale_root[ROOT].sum = 7;
        let error = restore(&from_built(stale_root, built.pending.clone())).unwrap_err();
        assert!(error.to_string().contains("invalid tree snapshot"));

        let mut long_ledger = built.pending.clone();
        long_ledger.push(0);
        assert!(restore(&from_built(built.nodes.clone(), long_ledger)).is_err());
    }
}
