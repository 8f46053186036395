use super::{tree, Aggregates, LazyTree, Span, Wide};

impl LazyTree {
    /// Resolves the delta pending at `node` and hands it down to both children.
    ///
    /// Runs at the start of every query/update visit, before the node's
    /// aggregates are trusted.
    pub(super) fn push(&mut self, node: usize, span: Span) {
        let delta = self.pending[node];
        if delta == 0 {
            return;
        }
        debug_assert!(!span.is_leaf(), "leaf {node} holds a pending delta");
        self.nodes[node].shift(delta, span.width());
        self.pending[node] = 0;
        self.defer_to_children(node, span, delta);
    }

    pub(super) fn defer_to_children(&mut self, node: usize, span: Span, delta: Wide) {
        let (left, right) = tree::children(node);
        let (left_span, right_span) = span.halves();
        self.defer(left, left_span, delta);
        self.defer(right, right_span, delta);
    }

    // merges into whatever the node already owes; a leaf has no children
    // to owe anything to, so it takes the delta at once
    fn defer(&mut self, node: usize, span: Span, delta: Wide) {
        if span.is_leaf() {
            self.nodes[node].shift(delta, 1);
        } else {
            self.pending[node] += delta;
        }
    }

    /// The aggregates of `node` with its own pending delta applied.
    fn resolved(&self, node: usize, span: Span) -> Aggregates {
        self.nodes[node].shifted(self.pending[node], span.width())
    }

    // children may still owe a delta (an update that missed them never pushed it),
    // so combine their resolved values rather than their raw ones
    pub(super) fn recombine(&mut self, node: usize, span: Span) {
        let (left, right) = tree::children(node);
        let (left_span, right_span) = span.halves();
        self.nodes[node] = Aggregates::combine(
            &self.resolved(left, left_span),
            &self.resolved(right, right_span),
        );
    }
}
