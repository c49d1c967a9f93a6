//! Forest of Euler tour trees over a fixed set of vertices.
//!
//! Every tree is stored as its Euler tour in one list of a [`Lists`]. A tree edge contributes two
//! nodes to the tour, one for each direction, and every vertex contributes a single node placed at
//! one of its visits. For example, these two tours describe the same tree:
//! `0 (0→1) 1 (1→4) 4 (4→1) (1→0)` and `0 (0→1) (1→4) 4 (4→1) 1 (1→0)`. Tours are cyclic, so any
//! rotation of a tour is also a valid representation.
//!
//! Vertex nodes additionally keep the non-tree edges incident to them, so a whole component can be
//! searched for one in O(log n).

use std::collections::{HashMap, HashSet};

use crate::{
    lists::{avl::AvlTrees, AggregatedData, Idx, Lists, SearchData, SearchDirection},
    violation::Violation,
};

pub type Vertex = usize;
/// Undirected edge, usually normalized so the first endpoint is the smaller one.
pub type Edge = (Vertex, Vertex);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EtData {
    Vertex {
        id: Vertex,
        /// Far endpoints of the non-tree edges stored at this vertex, in no particular order.
        nontree: Vec<Vertex>,
    },
    Edge {
        from: Vertex,
        to: Vertex,
        /// The edge belongs to the level of this forest, and isn't here only because a deeper
        /// forest holds it.
        on_level: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EtAg {
    /// Number of vertices in range
    pub size: usize,
    /// Number of non-tree edge entries in range
    pub nontree: usize,
    /// Number of tree edges in range that belong to this level
    pub on_level: usize,
}

impl AggregatedData for EtAg {
    type Data = EtData;
    fn from_data(data: &Self::Data) -> Self {
        match data {
            EtData::Vertex { nontree, .. } => Self {
                size: 1,
                nontree: nontree.len(),
                on_level: 0,
            },
            EtData::Edge { on_level, .. } => Self {
                on_level: (*on_level).into(),
                ..Self::default()
            },
        }
    }
    fn merge(self, right: Self) -> Self {
        Self {
            size: self.size + right.size,
            nontree: self.nontree + right.nontree,
            on_level: self.on_level + right.on_level,
        }
    }
}

pub fn normalize(a: Vertex, b: Vertex) -> Edge {
    (a.min(b), a.max(b))
}

fn alg_panic() -> ! {
    panic!("EulerTourForest algorithm incorrect")
}
fn or_alg_panic<T>(opt: Option<T>) -> T {
    opt.unwrap_or_else(|| alg_panic())
}

/// Walks towards the first node of the list whose own count is non-zero.
fn search_by(s: SearchData<'_, EtAg>, count: impl Fn(&EtAg) -> usize) -> SearchDirection {
    if count(s.left_agg) > 0 {
        SearchDirection::Left
    } else if count(&EtAg::from_data(s.current_data)) > 0 {
        SearchDirection::Found
    } else if count(s.right_agg) > 0 {
        SearchDirection::Right
    } else {
        SearchDirection::NotFound
    }
}

#[derive(Debug)]
pub struct EulerTourForest<L: Lists<EtAg> = AvlTrees<EtAg>> {
    lists: L,
    /// Node of each vertex.
    vertices: Vec<Idx>,
    /// (min, max) -> [node of min→max, node of max→min]
    tree_edges: HashMap<Edge, [Idx; 2]>,
    /// (min, max) -> [position of max in the list of min, position of min in the list of max]
    nontree_edges: HashMap<Edge, [usize; 2]>,
}

impl<L: Lists<EtAg>> EulerTourForest<L> {
    /// A forest on n vertices without edges.
    pub fn new(n: usize) -> Self {
        let mut lists = L::new(3 * n);
        let vertices = (0..n)
            .map(|id| {
                lists.create(EtData::Vertex {
                    id,
                    nontree: vec![],
                })
            })
            .collect();
        Self {
            lists,
            vertices,
            tree_edges: HashMap::new(),
            nontree_edges: HashMap::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Lists used to store the euler tours.
    pub fn lists(&self) -> &L {
        &self.lists
    }

    /// Node of vertex v in `lists`.
    pub fn node(&self, v: Vertex) -> Idx {
        assert!(v < self.vertices.len(), "vertex {v} out of range");
        self.vertices[v]
    }

    /// Checks whether vertices a and b are in the same tree. O(log n)
    pub fn connected(&self, a: Vertex, b: Vertex) -> bool {
        self.lists.on_same_list(self.node(a), self.node(b))
    }

    /// Number of vertices in the tree containing a. O(log n)
    pub fn size(&self, a: Vertex) -> usize {
        self.lists.total_agg(self.node(a)).size
    }

    /// Whether the tree containing a stores any non-tree edge. O(log n)
    pub fn has_nontree_edges(&self, a: Vertex) -> bool {
        self.lists.total_agg(self.node(a)).nontree > 0
    }

    pub fn is_tree_edge(&self, a: Vertex, b: Vertex) -> bool {
        self.tree_edges.contains_key(&normalize(a, b))
    }

    pub fn is_nontree_edge(&self, a: Vertex, b: Vertex) -> bool {
        self.nontree_edges.contains_key(&normalize(a, b))
    }

    /// Whether (a, b) is a tree edge belonging to the level of this forest. None if it isn't a
    /// tree edge.
    pub fn tree_edge_on_level(&self, a: Vertex, b: Vertex) -> Option<bool> {
        self.tree_edges.get(&normalize(a, b)).map(|nodes| {
            nodes
                .iter()
                .any(|&u| matches!(self.lists.data(u), EtData::Edge { on_level: true, .. }))
        })
    }

    /// All tree edges, normalized.
    pub fn tree_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.tree_edges.keys().copied()
    }

    /// All non-tree edges, normalized.
    pub fn nontree_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.nontree_edges.keys().copied()
    }

    /// Adds the tree edge (a, b), marked as belonging to the level of this forest if `on_level`.
    /// a and b must be in different trees. O(log n)
    pub fn insert_tree_edge(&mut self, a: Vertex, b: Vertex, on_level: bool) {
        assert!(
            !self.connected(a, b),
            "tree edge ({a}, {b}) would close a cycle"
        );
        log::trace!("link ({a}, {b}) on_level={on_level}");
        let ab = self.lists.create(EtData::Edge {
            from: a,
            to: b,
            on_level,
        });
        let ba = self.lists.create(EtData::Edge {
            from: b,
            to: a,
            on_level: false,
        });
        let nodes = if a < b { [ab, ba] } else { [ba, ab] };
        self.tree_edges.insert(normalize(a, b), nodes);

        let (a_head, a_tail) = self.lists.split(self.vertices[a]);
        let (b_head, b_tail) = self.lists.split(self.vertices[b]);
        // Rotate the tour of b so it starts right after a visit of b and ends with b.
        let b_tour = self.lists.concat(b_tail, b_head);
        let left = self.lists.merge(a_head, ab, b_tour);
        self.lists.merge(left, ba, a_tail);
    }

    /// Removes the tree edge (a, b), splitting its tree in two. O(log n)
    pub fn remove_tree_edge(&mut self, a: Vertex, b: Vertex) {
        let [first, second] = self
            .tree_edges
            .remove(&normalize(a, b))
            .unwrap_or_else(|| panic!("({a}, {b}) is not a tree edge"));
        log::trace!("cut ({a}, {b})");
        let (ab, ba) = if a < b {
            (first, second)
        } else {
            (second, first)
        };
        let (head, tail) = self.lists.split(ab);
        // The tour is either X ba M ab Y or X ab M ba Y. M becomes one tree, X Y the other.
        if self.lists.on_same_list(ba, head) {
            let (x, _m) = self.lists.split(ba);
            self.lists.concat(x, tail);
        } else {
            let (_m, y) = self.lists.split(ba);
            self.lists.concat(head, y);
        }
        for u in [ab, ba] {
            self.lists.unlink(u);
            self.lists.free(u);
        }
    }

    fn push_nontree_entry(&mut self, x: Vertex, y: Vertex) -> usize {
        let mut pos = 0;
        self.lists.mutate_data(self.vertices[x], |d| match d {
            EtData::Vertex { nontree, .. } => {
                nontree.push(y);
                pos = nontree.len() - 1;
            }
            EtData::Edge { .. } => alg_panic(),
        });
        pos
    }

    /// Removes the entry at `pos` of the list of x, moving the last entry into its place.
    fn erase_nontree_entry(&mut self, x: Vertex, pos: usize) {
        let mut moved = None;
        self.lists.mutate_data(self.vertices[x], |d| match d {
            EtData::Vertex { nontree, .. } => {
                nontree.swap_remove(pos);
                moved = nontree.get(pos).copied();
            }
            EtData::Edge { .. } => alg_panic(),
        });
        if let Some(y) = moved {
            let side = usize::from(x > y);
            or_alg_panic(self.nontree_edges.get_mut(&normalize(x, y)))[side] = pos;
        }
    }

    /// Stores the non-tree edge (a, b). a and b must already be in the same tree. O(log n)
    pub fn insert_nontree_edge(&mut self, a: Vertex, b: Vertex) {
        assert!(a != b, "self-loops are not stored");
        assert!(
            self.connected(a, b),
            "non-tree edge ({a}, {b}) joins different trees"
        );
        assert!(
            !self.is_tree_edge(a, b) && !self.is_nontree_edge(a, b),
            "edge ({a}, {b}) is already stored"
        );
        let (x, y) = normalize(a, b);
        let positions = [self.push_nontree_entry(x, y), self.push_nontree_entry(y, x)];
        self.nontree_edges.insert((x, y), positions);
    }

    /// Removes the non-tree edge (a, b). O(log n)
    pub fn remove_nontree_edge(&mut self, a: Vertex, b: Vertex) {
        let (x, y) = normalize(a, b);
        let [px, py] = self
            .nontree_edges
            .remove(&(x, y))
            .unwrap_or_else(|| panic!("({a}, {b}) is not a non-tree edge"));
        self.erase_nontree_entry(x, px);
        self.erase_nontree_entry(y, py);
    }

    /// Clears the on-level mark of one tree edge in the tree of a. Returns the edge, oriented as
    /// its marked node was.
    fn promote_tree_edge(&mut self, a: Vertex) -> Option<Edge> {
        let u = self
            .lists
            .find_element(self.node(a), |s| search_by(s, |ag| ag.on_level));
        if u == L::EMPTY {
            return None;
        }
        let mut edge = None;
        self.lists.mutate_data(u, |d| match d {
            EtData::Edge { from, to, on_level } if *on_level => {
                *on_level = false;
                edge = Some((*from, *to));
            }
            _ => alg_panic(),
        });
        edge
    }

    /// Clears the on-level mark of every tree edge in the tree of a, and returns those edges.
    /// O(k log n) for k edges.
    pub fn promote_tree_edges(&mut self, a: Vertex) -> Vec<Edge> {
        let edges: Vec<_> = std::iter::from_fn(|| self.promote_tree_edge(a)).collect();
        log::trace!("promoted {} tree edges around {a}", edges.len());
        edges
    }

    /// Removes any non-tree edge stored in the tree of a and returns it, with the endpoint that
    /// held the found entry first. O(log n)
    pub fn pop_nontree_edge(&mut self, a: Vertex) -> Option<Edge> {
        let u = self
            .lists
            .find_element(self.node(a), |s| search_by(s, |ag| ag.nontree));
        if u == L::EMPTY {
            return None;
        }
        let (x, y, pos) = match self.lists.data(u) {
            EtData::Vertex { id, nontree } => {
                (*id, *or_alg_panic(nontree.last()), nontree.len() - 1)
            }
            EtData::Edge { .. } => alg_panic(),
        };
        let side = usize::from(x > y);
        let positions = or_alg_panic(self.nontree_edges.remove(&normalize(x, y)));
        debug_assert_eq!(positions[side], pos);
        self.erase_nontree_entry(x, pos);
        self.erase_nontree_entry(y, positions[side ^ 1]);
        log::trace!("popped non-tree edge ({x}, {y})");
        Some((x, y))
    }

    /// Number of trees. O(n log n)
    pub fn count_components(&self) -> usize {
        self.vertices
            .iter()
            .map(|&u| self.lists.root(u))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Checks every invariant of the forest and of the lists holding it.
    /// O(n log n + m) for m edges.
    pub fn check(&self) -> Result<(), Violation> {
        let mut roots = HashSet::new();
        let mut stored_nontree = 0;
        let mut stored_tree = 0;
        for (v, &u) in self.vertices.iter().enumerate() {
            let EtData::Vertex { id, nontree } = self.lists.data(u) else {
                return Err(Violation::VertexNode { vertex: v });
            };
            if *id != v {
                return Err(Violation::VertexNode { vertex: v });
            }
            for (pos, &w) in nontree.iter().enumerate() {
                let side = usize::from(v > w);
                let registered = self.nontree_edges.get(&normalize(v, w)).map(|p| p[side]);
                if registered != Some(pos) || !self.connected(v, w) {
                    return Err(Violation::NontreeEdge { a: v, b: w });
                }
            }
            let root = self.lists.root(u);
            if roots.insert(root) {
                self.lists.validate(root)?;
                let (len, ag) = (self.lists.len(root), self.lists.total_agg(root));
                // k vertex nodes and two nodes for each of the k - 1 tree edges.
                if len + 2 != 3 * ag.size {
                    return Err(Violation::TourShape {
                        vertex: v,
                        len,
                        size: ag.size,
                    });
                }
                stored_nontree += ag.nontree;
                stored_tree += len - ag.size;
            }
        }
        if stored_nontree != 2 * self.nontree_edges.len() {
            return Err(Violation::RegistryCount {
                kind: "non-tree",
                registered: self.nontree_edges.len(),
                stored: stored_nontree / 2,
            });
        }
        if stored_tree != 2 * self.tree_edges.len() {
            return Err(Violation::RegistryCount {
                kind: "tree",
                registered: self.tree_edges.len(),
                stored: stored_tree / 2,
            });
        }
        for (&(a, b), &[first, second]) in &self.tree_edges {
            let consistent = match (self.lists.data(first), self.lists.data(second)) {
                (
                    EtData::Edge {
                        from: f1,
                        to: t1,
                        on_level: o1,
                    },
                    EtData::Edge {
                        from: f2,
                        to: t2,
                        on_level: o2,
                    },
                ) => {
                    (*f1, *t1, *f2, *t2) == (a, b, b, a)
                        && !(*o1 && *o2)
                        && self.lists.on_same_list(first, second)
                        && self.connected(a, b)
                        && !self.nontree_edges.contains_key(&(a, b))
                }
                _ => false,
            };
            if !consistent {
                return Err(Violation::TreeEdge { a, b });
            }
        }
        Ok(())
    }
}
