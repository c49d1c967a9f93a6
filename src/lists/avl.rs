use std::fmt::{Debug, Display, Formatter};

use debug_tree::{add_branch_to, AsTree, TreeBuilder};
use derivative::Derivative;

use super::{AggregatedData, Idx, Lists, SearchData, SearchDirection};
use crate::violation::Violation;

const EMPTY: Idx = usize::MAX;
const LEFT: usize = 0;
const RIGHT: usize = 1;

fn node_fmt(u: &Idx, f: &mut Formatter) -> std::fmt::Result {
    if *u == EMPTY {
        write!(f, "∅")
    } else {
        write!(f, "{u}")
    }
}
fn node2_fmt([u, v]: &[Idx; 2], f: &mut Formatter) -> std::fmt::Result {
    write!(f, "[")?;
    node_fmt(u, f)?;
    write!(f, ", ")?;
    node_fmt(v, f)?;
    write!(f, "]")
}

/// Used to pretty print a Idx, outputting ∅ if it is EMPTY.
pub struct PrettyIdx(pub Idx);

impl Display for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        node_fmt(&self.0, f)
    }
}

impl Debug for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

use PrettyIdx as I;

#[derive(Derivative)]
#[derivative(Debug)]
struct Node<Ag: AggregatedData> {
    #[derivative(Debug(format_with = "node_fmt"))]
    parent: Idx,
    /// Left and right child
    #[derivative(Debug(format_with = "node2_fmt"))]
    child: [Idx; 2],
    /// Height of the subtree. Zero marks a freed node.
    height: usize,
    /// Number of nodes in the subtree.
    size: usize,
    /// Data for this node
    data: Ag::Data,
    /// Aggregated data for this node's subtree
    ag_data: Ag,
}

impl<Ag: AggregatedData> Node<Ag> {
    fn new(data: Ag::Data) -> Self {
        Self {
            ag_data: Ag::from_data(&data),
            data,
            child: [EMPTY; 2],
            parent: EMPTY,
            height: 1,
            size: 1,
        }
    }
    fn is_single(&self) -> bool {
        self.parent == EMPTY && self.child == [EMPTY; 2]
    }
}

/// Lists stored as AVL trees in an arena. Every list is the in-order sequence of one tree, and
/// every node keeps a link to its parent, so the root of a node's list is found in O(log n).
pub struct AvlTrees<Ag: AggregatedData = ()> {
    nodes: Vec<Node<Ag>>,
    /// Freed slots, reused by `create`.
    free: Vec<Idx>,
}

impl<Ag: AggregatedData> Debug for AvlTrees<Ag> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let builder = TreeBuilder::new();
        let _b = builder.add_branch("AvlTrees");
        for (u, node) in self.nodes.iter().enumerate() {
            if node.parent == EMPTY && node.height > 0 {
                self.tree_inorder_dbg(u, &builder);
            }
        }
        writeln!(f, "{}", builder.string())
    }
}

impl<Ag: AggregatedData> AvlTrees<Ag> {
    fn tree_inorder_dbg<T: AsTree>(&self, u: Idx, tree: &T) {
        let nu = &self.nodes[u];
        if nu.child[LEFT] != EMPTY {
            add_branch_to!(*tree, "left child of {u}");
            self.tree_inorder_dbg(nu.child[LEFT], tree);
        }
        add_branch_to!(*tree, "[{u}] {nu:?}");
        if nu.child[RIGHT] != EMPTY {
            self.tree_inorder_dbg(nu.child[RIGHT], tree);
        }
    }
    fn n(&self, u: Idx) -> Option<&Node<Ag>> {
        if u == EMPTY {
            None
        } else {
            Some(&self.nodes[u])
        }
    }
    fn child(&self, u: Idx) -> [Idx; 2] {
        self.n(u).map_or([EMPTY; 2], |n| n.child)
    }
    fn parent(&self, u: Idx) -> Idx {
        self.n(u).map_or(EMPTY, |n| n.parent)
    }
    fn height(&self, u: Idx) -> usize {
        self.n(u).map_or(0, |n| n.height)
    }
    fn size(&self, u: Idx) -> usize {
        self.n(u).map_or(0, |n| n.size)
    }
    fn ag_data(&self, u: Idx) -> Ag {
        self.n(u).map_or_else(Ag::default, |n| n.ag_data.clone())
    }
    // Call when children are changed.
    fn recalc(&mut self, u: Idx) -> Idx {
        let [l, r] = self.nodes[u].child;
        let ag = self
            .ag_data(l)
            .merge(Ag::from_data(&self.nodes[u].data))
            .merge(self.ag_data(r));
        let (height, size) = (
            1 + self.height(l).max(self.height(r)),
            1 + self.size(l) + self.size(r),
        );
        let n = &mut self.nodes[u];
        n.ag_data = ag;
        n.height = height;
        n.size = size;
        u
    }
    fn set_child(&mut self, u: Idx, side: usize, c: Idx) {
        self.nodes[u].child[side] = c;
        if c != EMPTY {
            self.nodes[c].parent = u;
        }
    }
    /// Puts `new` in the child slot of `p` that holds `old`. If `p` is EMPTY, `new` becomes a root.
    fn replace_child(&mut self, p: Idx, old: Idx, new: Idx) {
        if p == EMPTY {
            if new != EMPTY {
                self.nodes[new].parent = EMPTY;
            }
        } else {
            let side = if self.nodes[p].child[LEFT] == old {
                LEFT
            } else {
                RIGHT
            };
            self.set_child(p, side, new);
        }
    }
    /// Detaches both children of u, which become roots, and returns them.
    fn take_children(&mut self, u: Idx) -> [Idx; 2] {
        let children = std::mem::replace(&mut self.nodes[u].child, [EMPTY; 2]);
        for c in children {
            if c != EMPTY {
                self.nodes[c].parent = EMPTY;
            }
        }
        children
    }
    /// Lifts child `side` of u to u's place. Returns the new local root.
    fn rotate(&mut self, u: Idx, side: usize) -> Idx {
        let p = self.nodes[u].parent;
        let c = self.nodes[u].child[side];
        let inner = self.nodes[c].child[side ^ 1];
        self.set_child(u, side, inner);
        self.replace_child(p, u, c);
        self.set_child(c, side ^ 1, u);
        self.recalc(u);
        self.recalc(c)
    }
    fn rotate_left(&mut self, u: Idx) -> Idx {
        self.rotate(u, RIGHT)
    }
    fn rotate_right(&mut self, u: Idx) -> Idx {
        self.rotate(u, LEFT)
    }
    /// Restores the AVL condition at u, whose children may differ in height by at most 2, and
    /// recomputes its data. Returns the root of the subtree that took u's place.
    fn balance(&mut self, u: Idx) -> Idx {
        let [l, r] = self.nodes[u].child;
        let (hl, hr) = (self.height(l), self.height(r));
        debug_assert!(hl.abs_diff(hr) <= 2, "node {u} is too unbalanced");
        if hl > hr + 1 {
            let [ll, lr] = self.nodes[l].child;
            if self.height(lr) > self.height(ll) {
                self.rotate_left(l);
            }
            self.rotate_right(u)
        } else if hr > hl + 1 {
            let [rl, rr] = self.nodes[r].child;
            if self.height(rl) > self.height(rr) {
                self.rotate_right(r);
            }
            self.rotate_left(u)
        } else {
            self.recalc(u)
        }
    }
    /// Balances u and all its ancestors. Returns the root.
    fn rebalance_up(&mut self, mut u: Idx) -> Idx {
        loop {
            let top = self.balance(u);
            let p = self.nodes[top].parent;
            if p == EMPTY {
                return top;
            }
            u = p;
        }
    }
    /// Joins the trees rooted at `l` and `r` with the single node `m` between them.
    /// Takes O(|height(l) - height(r)|).
    fn join(&mut self, l: Idx, m: Idx, r: Idx) -> Idx {
        let (hl, hr) = (self.height(l), self.height(r));
        log::trace!("join({}, {m}, {}) heights {hl} {hr}", I(l), I(r));
        if hl > hr + 1 {
            let [_, c] = self.child(l);
            if c != EMPTY {
                self.nodes[c].parent = EMPTY;
            }
            let t = self.join(c, m, r);
            self.set_child(l, RIGHT, t);
            self.balance(l)
        } else if hr > hl + 1 {
            let [c, _] = self.child(r);
            if c != EMPTY {
                self.nodes[c].parent = EMPTY;
            }
            let t = self.join(l, m, c);
            self.set_child(r, LEFT, t);
            self.balance(r)
        } else {
            self.set_child(m, LEFT, l);
            self.set_child(m, RIGHT, r);
            self.recalc(m)
        }
    }
    /// Joins the trees rooted at `l` and `r`, using the last node of `l` as the middle.
    fn join2(&mut self, l: Idx, r: Idx) -> Idx {
        if l == EMPTY {
            return r;
        } else if r == EMPTY {
            return l;
        }
        let mut last = l;
        while self.nodes[last].child[RIGHT] != EMPTY {
            last = self.nodes[last].child[RIGHT];
        }
        let rest = self.unlink(last);
        self.join(rest, last, r)
    }
    fn check_subtree(&self, u: Idx) -> Result<(), Violation> {
        let node = &self.nodes[u];
        if node.height == 0 {
            return Err(Violation::FreedNode { node: u });
        }
        let [l, r] = node.child;
        for c in [l, r] {
            if c != EMPTY {
                if self.nodes[c].parent != u {
                    return Err(Violation::ParentLink { node: c });
                }
                self.check_subtree(c)?;
            }
        }
        let (hl, hr) = (self.height(l), self.height(r));
        if hl.abs_diff(hr) > 1 {
            return Err(Violation::Unbalanced {
                node: u,
                left: hl,
                right: hr,
            });
        }
        if node.height != 1 + hl.max(hr) {
            return Err(Violation::Height {
                node: u,
                stored: node.height,
                expected: 1 + hl.max(hr),
            });
        }
        let size = 1 + self.size(l) + self.size(r);
        if node.size != size {
            return Err(Violation::Size {
                node: u,
                stored: node.size,
                expected: size,
            });
        }
        let ag = self
            .ag_data(l)
            .merge(Ag::from_data(&node.data))
            .merge(self.ag_data(r));
        if node.ag_data != ag {
            return Err(Violation::Aggregate {
                node: u,
                stored: format!("{:?}", node.ag_data),
                expected: format!("{ag:?}"),
            });
        }
        Ok(())
    }
}

impl<Ag: AggregatedData> Lists<Ag> for AvlTrees<Ag> {
    const EMPTY: Idx = EMPTY;

    fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    fn create(&mut self, data: Ag::Data) -> Idx {
        if let Some(u) = self.free.pop() {
            self.nodes[u] = Node::new(data);
            u
        } else {
            self.nodes.push(Node::new(data));
            self.nodes.len() - 1
        }
    }

    fn free(&mut self, u: Idx) {
        let n = &mut self.nodes[u];
        assert!(n.height > 0, "node {u} was already freed");
        assert!(n.is_single(), "only single nodes can be freed");
        n.height = 0;
        self.free.push(u);
    }

    fn total_size(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn root(&self, mut u: Idx) -> Idx {
        while self.parent(u) != EMPTY {
            u = self.nodes[u].parent;
        }
        u
    }

    fn data(&self, u: Idx) -> &Ag::Data {
        &self.nodes[u].data
    }

    fn mutate_data(&mut self, mut u: Idx, f: impl FnOnce(&mut Ag::Data)) {
        f(&mut self.nodes[u].data);
        while u != EMPTY {
            self.recalc(u);
            u = self.nodes[u].parent;
        }
    }

    fn order(&self, u: Idx) -> usize {
        if u == EMPTY {
            return 0;
        }
        let mut ord = self.size(self.nodes[u].child[LEFT]);
        let mut cur = u;
        while self.parent(cur) != EMPTY {
            let p = self.nodes[cur].parent;
            let [l, r] = self.nodes[p].child;
            if cur == r {
                ord += self.size(l) + 1;
            }
            cur = p;
        }
        ord
    }

    fn find_element(
        &self,
        u: Idx,
        mut search_strategy: impl FnMut(SearchData<'_, Ag>) -> SearchDirection,
    ) -> Idx {
        let mut u = self.root(u);
        use SearchDirection::*;
        while u != EMPTY {
            let [l, r] = self.child(u);
            match search_strategy(SearchData {
                current_data: self.data(u),
                left_agg: &self.ag_data(l),
                right_agg: &self.ag_data(r),
            }) {
                Found => return u,
                NotFound => return EMPTY,
                Left => u = l,
                Right => u = r,
            }
        }
        EMPTY
    }

    fn find_kth(&self, u: Idx, mut k: usize) -> Idx {
        let mut u = self.root(u);
        while u != EMPTY {
            let [l, r] = self.child(u);
            let sl = self.size(l);
            if sl > k {
                u = l;
            } else if sl == k {
                return u;
            } else {
                k -= sl + 1;
                u = r;
            }
        }
        EMPTY
    }

    fn len(&self, u: Idx) -> usize {
        self.size(self.root(u))
    }

    fn total_agg(&self, u: Idx) -> Ag {
        self.ag_data(self.root(u))
    }

    fn merge(&mut self, left: Idx, middle: Idx, right: Idx) -> Idx {
        let (l, r) = (self.root(left), self.root(right));
        if middle == EMPTY {
            if l == r {
                return l;
            }
            return self.join2(l, r);
        }
        assert!(
            self.nodes[middle].is_single(),
            "middle node {middle} is not alone in its list"
        );
        assert!(l == EMPTY || l != r, "cannot merge a list with itself");
        self.join(l, middle, r)
    }

    fn split(&mut self, u: Idx) -> (Idx, Idx) {
        // The whole ancestor chain is captured before any link changes, since the joins below
        // rewrite parent links of nodes that are still to be visited.
        let mut path = vec![];
        let mut cur = u;
        while self.parent(cur) != EMPTY {
            let p = self.nodes[cur].parent;
            let side = if self.nodes[p].child[LEFT] == cur {
                LEFT
            } else {
                RIGHT
            };
            path.push((p, side, self.nodes[p].child[side ^ 1]));
            cur = p;
        }
        log::trace!("split({u}) with {} ancestors", path.len());
        let [l, r] = self.take_children(u);
        self.nodes[u].parent = EMPTY;
        let mut left = self.join(l, u, EMPTY);
        let mut right = r;
        for (p, side, sibling) in path {
            let node = &mut self.nodes[p];
            node.parent = EMPTY;
            node.child = [EMPTY; 2];
            if sibling != EMPTY {
                self.nodes[sibling].parent = EMPTY;
            }
            if side == RIGHT {
                left = self.join(sibling, p, left);
            } else {
                right = self.join(right, p, sibling);
            }
        }
        (left, right)
    }

    fn unlink(&mut self, u: Idx) -> Idx {
        let p = self.nodes[u].parent;
        let [l, r] = self.take_children(u);
        self.nodes[u].parent = EMPTY;
        self.recalc(u);
        let sub = self.join2(l, r);
        if p == EMPTY {
            return sub;
        }
        self.replace_child(p, u, sub);
        self.rebalance_up(p)
    }

    fn validate(&self, u: Idx) -> Result<(), Violation> {
        let root = self.root(u);
        if root == EMPTY {
            return Ok(());
        }
        self.check_subtree(root)
    }
}
