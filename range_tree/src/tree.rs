use super::{nodes::Aggregates, Error, Result, Value, Wide};
use serde::{Deserialize, Serialize};

enum TreeDir {
    Left,
    Right,
}

pub const ROOT: usize = 0;

/// How many table slots a tree over `N` elements reserves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// `4 * N` slots, which is enough for any `N`.
    #[default]
    FourN,
    /// Exactly `2 * N.next_power_of_two() - 1` slots.
    PowerOfTwo,
}

impl Layout {
    // assumes leaf_count > 0 and a table that fits in memory
    pub fn table_len(self, leaf_count: usize) -> usize {
        match self {
            Layout::FourN => 4 * leaf_count,
            Layout::PowerOfTwo => 2 * leaf_count.next_power_of_two() - 1,
        }
    }

    /// `table_len` for a leaf count that came from outside, e.g. a snapshot.
    pub fn checked_table_len(self, leaf_count: usize) -> Option<usize> {
        if leaf_count == 0 {
            return None;
        }
        match self {
            Layout::FourN => leaf_count.checked_mul(4),
            Layout::PowerOfTwo => leaf_count
                .checked_next_power_of_two()
                .and_then(|len| len.checked_mul(2))
                .map(|len| len - 1),
        }
    }
}

/// The inclusive element range `[lo, hi]` covered by a node.
///
/// Spans are never stored; every walk recomputes them from the root down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

impl Span {
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    // assumes leaf_count > 0
    pub fn whole(leaf_count: usize) -> Self {
        Self::new(0, leaf_count - 1)
    }

    /// Validates a caller-supplied range against a tree of `leaf_count` elements.
    pub fn checked(l: usize, r: usize, leaf_count: usize) -> Result<Self> {
        if l > r || r >= leaf_count {
            log::debug!("rejected range [{l}, {r}] over {leaf_count} elements");
            return Err(Error::InvalidRange {
                l,
                r,
                len: leaf_count,
            });
        }
        Ok(Self::new(l, r))
    }

    pub fn width(self) -> usize {
        self.hi - self.lo + 1
    }

    pub fn is_leaf(self) -> bool {
        self.lo == self.hi
    }

    pub fn mid(self) -> usize {
        self.lo + (self.hi - self.lo) / 2
    }

    pub fn halves(self) -> (Span, Span) {
        let mid = self.mid();
        (Span::new(self.lo, mid), Span::new(mid + 1, self.hi))
    }

    pub fn overlaps(self, other: Span) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }

    pub fn contained_in(self, other: Span) -> bool {
        other.lo <= self.lo && self.hi <= other.hi
    }
}

pub fn check_index(index: usize, leaf_count: usize) -> Result<()> {
    if index >= leaf_count {
        log::debug!("rejected index {index} over {leaf_count} elements");
        return Err(Error::IndexOutOfBounds {
            index,
            len: leaf_count,
        });
    }
    Ok(())
}

fn child(node: usize, dir: TreeDir) -> usize {
    match dir {
        TreeDir::Left => 2 * node + 1,
        TreeDir::Right => 2 * node + 2,
    }
}

// only meaningful for nodes whose span isn't a leaf
pub fn children(node: usize) -> (usize, usize) {
    (child(node, TreeDir::Left), child(node, TreeDir::Right))
}

pub fn parent(node: usize) -> Option<usize> {
    if node == ROOT {
        None
    } else {
        Some((node - 1) / 2)
    }
}

/// Builds the aggregate table for `elements` bottom-up.
///
/// Slots that no span maps to keep the default value and are never read.
pub fn build_table(elements: &[Value], layout: Layout) -> Result<Vec<Aggregates>> {
    if elements.is_empty() {
        log::debug!("rejected build over an empty array");
        return Err(Error::EmptyInput);
    }
    let mut nodes = vec![Aggregates::default(); layout.table_len(elements.len())];
    build_node(&mut nodes, ROOT, Span::whole(elements.len()), elements);
    log::debug!(
        "built table of {} slots over {} elements ({:?})",
        nodes.len(),
        elements.len(),
        layout
    );
    Ok(nodes)
}

fn build_node(nodes: &mut [Aggregates], node: usize, span: Span, elements: &[Value]) {
    if span.is_leaf() {
        nodes[node] = Aggregates::leaf(elements[span.lo]);
        return;
    }
    let (left, right) = children(node);
    let (left_span, right_span) = span.halves();
    build_node(nodes, left, left_span, elements);
    build_node(nodes, right, right_span, elements);
    nodes[node] = Aggregates::combine(&nodes[left], &nodes[right]);
}

/// Checks a table handed in from outside (a deserialized snapshot) against
/// everything `build_table` and the update paths guarantee.
///
/// `pending` is `None` for trees without a ledger. For every node reachable
/// from the root, the cached aggregates shifted by all pending deltas on its
/// path must equal the true aggregates of its leaves, and every leaf value
/// must fit in a `Value`. All arithmetic is checked, since the input is
/// untrusted.
pub fn check_table(
    nodes: &[Aggregates],
    pending: Option<&[Wide]>,
    leaf_count: usize,
    layout: Layout,
) -> Result<()> {
    let table_len = layout
        .checked_table_len(leaf_count)
        .ok_or(Error::InvalidSnapshot("leaf count does not fit the layout"))?;
    if nodes.len() != table_len {
        return Err(Error::InvalidSnapshot("aggregate table has the wrong length"));
    }
    if pending.is_some_and(|pending| pending.len() != table_len) {
        return Err(Error::InvalidSnapshot("pending ledger has the wrong length"));
    }
    check_node(nodes, pending, ROOT, Span::whole(leaf_count), 0).map(|_| ())
}

// the largest magnitude a pending delta can reach: the difference of two Values
const PENDING_BOUND: Wide = 1 << 64;

// returns the true aggregates of the node's range
fn check_node(
    nodes: &[Aggregates],
    pending: Option<&[Wide]>,
    node: usize,
    span: Span,
    carried: Wide,
) -> Result<Aggregates> {
    let own = pending.map_or(0, |pending| pending[node]);
    if !(-PENDING_BOUND..=PENDING_BOUND).contains(&own) {
        return Err(Error::InvalidSnapshot("pending delta out of range"));
    }
    if span.is_leaf() && own != 0 {
        return Err(Error::InvalidSnapshot("leaf holds a pending delta"));
    }
    let carried = carried
        .checked_add(own)
        .ok_or(Error::InvalidSnapshot("pending deltas overflow"))?;
    let cached = nodes[node];

    let actual = if span.is_leaf() {
        let value = cached
            .sum
            .checked_add(carried)
            .and_then(|value| Value::try_from(value).ok())
            .ok_or(Error::InvalidSnapshot("element does not fit in an i64"))?;
        if cached.min != cached.sum || cached.max != cached.sum {
            return Err(Error::InvalidSnapshot("leaf aggregates disagree"));
        }
        Aggregates::leaf(value)
    } else {
        let (left, right) = children(node);
        let (left_span, right_span) = span.halves();
        Aggregates::combine(
            &check_node(nodes, pending, left, left_span, carried)?,
            &check_node(nodes, pending, right, right_span, carried)?,
        )
    };

    // what the node should cache, given what is still owed to it
    let width = Wide::try_from(span.width()).unwrap_or(Wide::MAX);
    let expected = carried.checked_mul(width).and_then(|owed| {
        Some(Aggregates {
            sum: actual.sum.checked_sub(owed)?,
            min: actual.min.checked_sub(carried)?,
            max: actual.max.checked_sub(carried)?,
        })
    });
    if expected != Some(cached) {
        return Err(Error::InvalidSnapshot("cached aggregates disagree with leaves"));
    }
    Ok(actual)
}
