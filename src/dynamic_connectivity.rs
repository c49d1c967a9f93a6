use std::{
    cmp::Ordering,
    collections::{hash_map::Entry, HashMap},
};

use crate::{
    euler_tour_forest::{normalize, Edge, EtAg, EulerTourForest, Vertex},
    lists::{avl::AvlTrees, Lists},
    violation::Violation,
};

pub trait DynamicConnectivity {
    /// New instance for an empty graph on n vertices.
    fn new(n: usize) -> Self;
    /// Adds one instance of the undirected edge (a, b). Parallel edges and self-loops are allowed.
    fn insert(&mut self, a: Vertex, b: Vertex);
    /// Removes one instance of the edge (a, b). Returns whether there was one to remove.
    fn remove(&mut self, a: Vertex, b: Vertex) -> bool;
    /// Check if a and b are connected.
    fn connected(&self, a: Vertex, b: Vertex) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeRecord {
    /// Level of the edge, in 0..forests.len()
    level: usize,
    /// Number of parallel copies currently inserted
    multiplicity: usize,
}

/// Fully dynamic connectivity by Holm, de Lichtenberg and Thorup.
///
/// Each edge has a level in 0..=⌈log₂ n⌉, new edges start at level 0. Forest `l` is a spanning
/// forest of the edges of level at least `l`, and is a subforest of forest `l - 1`. Trees of forest
/// `l` have at most n / 2^l vertices. When a tree edge is removed, the search for a replacement
/// raises the level of every edge it looks at without success, so each edge costs O(log n) searches
/// over its lifetime, and each operation takes amortized O(log² n).
///
/// Edges of level l that are not in forest l are non-tree edges, and are stored at their endpoints
/// in forest l only.
#[derive(Debug)]
pub struct HdtConnectivity<L: Lists<EtAg> = AvlTrees<EtAg>> {
    forests: Vec<EulerTourForest<L>>,
    /// Every present edge, normalized. Self-loops are recorded but never stored in the forests.
    edges: HashMap<Edge, EdgeRecord>,
    components: usize,
}

/// ⌈log₂ n⌉, or 0 for n <= 1.
fn max_level(n: usize) -> usize {
    n.next_power_of_two().trailing_zeros() as usize
}

impl<L: Lists<EtAg>> HdtConnectivity<L> {
    fn check_vertex(&self, v: Vertex) {
        assert!(
            v < self.vertex_count(),
            "vertex {v} out of range for {} vertices",
            self.vertex_count()
        );
    }

    pub fn vertex_count(&self) -> usize {
        self.forests[0].vertex_count()
    }

    /// Number of forests, one per level.
    pub fn levels(&self) -> usize {
        self.forests.len()
    }

    /// Forest holding the edges of level at least `level`.
    pub fn forest(&self, level: usize) -> &EulerTourForest<L> {
        &self.forests[level]
    }

    /// Number of connected components. O(1)
    pub fn component_count(&self) -> usize {
        self.components
    }

    /// Number of vertices connected to v. O(log n)
    pub fn component_size(&self, v: Vertex) -> usize {
        self.check_vertex(v);
        self.forests[0].size(v)
    }

    /// How many copies of (a, b) are present.
    pub fn edge_multiplicity(&self, a: Vertex, b: Vertex) -> usize {
        self.edges
            .get(&normalize(a, b))
            .map_or(0, |r| r.multiplicity)
    }

    /// Current level of (a, b), if present.
    pub fn edge_level(&self, a: Vertex, b: Vertex) -> Option<usize> {
        self.edges.get(&normalize(a, b)).map(|r| r.level)
    }

    /// Stores (a, b) with the given level, either as a tree edge in forests 0..=level or as a
    /// non-tree edge of forest `level`.
    fn insert_edge(&mut self, a: Vertex, b: Vertex, level: usize) {
        if let Some(record) = self.edges.get_mut(&normalize(a, b)) {
            record.level = level;
        }
        if self.forests[level].connected(a, b) {
            self.forests[level].insert_nontree_edge(a, b);
        } else {
            for (l, forest) in self.forests[..=level].iter_mut().enumerate() {
                forest.insert_tree_edge(a, b, l == level);
            }
        }
    }

    /// Looks for an edge reconnecting a and b, after a tree edge of the given level between them
    /// was removed. Returns the edge and its level, with the edge already taken out of its forest.
    fn find_replacement(&mut self, a: Vertex, b: Vertex, level: usize) -> Option<(Edge, usize)> {
        for l in (0..=level).rev() {
            let (small, big) = if self.forests[l].size(a) <= self.forests[l].size(b) {
                (a, b)
            } else {
                (b, a)
            };
            log::trace!(
                "level {l}: searching around {small} ({} vertices), other side {big} ({} vertices)",
                self.forests[l].size(small),
                self.forests[l].size(big)
            );
            // The tree of `small` has at most half the vertices allowed on level l, so all of its
            // edges fit on level l + 1.
            for (x, y) in self.forests[l].promote_tree_edges(small) {
                self.forests[l + 1].insert_tree_edge(x, y, true);
                if let Some(record) = self.edges.get_mut(&normalize(x, y)) {
                    record.level = l + 1;
                }
            }
            while let Some((x, y)) = self.forests[l].pop_nontree_edge(small) {
                if self.forests[l].connected(x, y) {
                    self.insert_edge(x, y, l + 1);
                } else {
                    log::trace!("level {l}: ({x}, {y}) replaces the removed edge");
                    return Some(((x, y), l));
                }
            }
        }
        log::trace!("no replacement for ({a}, {b})");
        None
    }

    /// Checks all invariants: the lists and forests themselves, nesting of the forests, size of
    /// their trees, placement of every edge according to its level and the component count.
    pub fn check(&self) -> Result<(), Violation> {
        let n = self.vertex_count();
        for (l, forest) in self.forests.iter().enumerate() {
            forest.check()?;
            // Lone vertices are fine on every level.
            let max = (n >> l).max(1);
            for v in 0..n {
                let size = forest.size(v);
                if size > max {
                    return Err(Violation::ComponentSize {
                        level: l,
                        vertex: v,
                        size,
                        max,
                    });
                }
            }
            for (a, b) in forest.tree_edges().chain(forest.nontree_edges()) {
                if !self.edges.contains_key(&(a, b)) {
                    return Err(Violation::UnknownEdge { a, b, level: l });
                }
            }
            if l > 0 {
                for (a, b) in forest.tree_edges() {
                    if !self.forests[l - 1].is_tree_edge(a, b) {
                        return Err(Violation::Nesting { a, b, level: l });
                    }
                }
            }
        }
        for (&(a, b), record) in &self.edges {
            if a == b {
                continue;
            }
            let level = record.level;
            let is_tree = level < self.forests.len() && self.forests[level].is_tree_edge(a, b);
            for (l, forest) in self.forests.iter().enumerate() {
                let on_level = forest.tree_edge_on_level(a, b);
                let expected = match (is_tree, l.cmp(&level)) {
                    (true, Ordering::Less) => Some(false),
                    (true, Ordering::Equal) => Some(true),
                    _ => None,
                };
                if on_level != expected || forest.is_nontree_edge(a, b) != (!is_tree && l == level)
                {
                    return Err(Violation::EdgeLevel {
                        a,
                        b,
                        level,
                        forest: l,
                    });
                }
            }
        }
        let actual = self.forests[0].count_components();
        if actual != self.components {
            return Err(Violation::ComponentCount {
                stored: self.components,
                actual,
            });
        }
        Ok(())
    }

    /// Whether all invariants hold. Logs the broken one otherwise. O(n log² n + m log n)
    pub fn validate(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(e) => {
                log::error!("invalid dynamic connectivity structure: {e}");
                false
            }
        }
    }
}

impl<L: Lists<EtAg>> DynamicConnectivity for HdtConnectivity<L> {
    fn new(n: usize) -> Self {
        Self {
            forests: (0..=max_level(n)).map(|_| EulerTourForest::new(n)).collect(),
            edges: HashMap::new(),
            components: n,
        }
    }

    fn insert(&mut self, a: Vertex, b: Vertex) {
        self.check_vertex(a);
        self.check_vertex(b);
        log::debug!("insert ({a}, {b})");
        let record = self.edges.entry(normalize(a, b)).or_insert(EdgeRecord {
            level: 0,
            multiplicity: 0,
        });
        record.multiplicity += 1;
        if record.multiplicity > 1 || a == b {
            return;
        }
        if !self.forests[0].connected(a, b) {
            self.components -= 1;
        }
        self.insert_edge(a, b, 0);
    }

    fn remove(&mut self, a: Vertex, b: Vertex) -> bool {
        self.check_vertex(a);
        self.check_vertex(b);
        let Entry::Occupied(mut entry) = self.edges.entry(normalize(a, b)) else {
            return false;
        };
        log::debug!("remove ({a}, {b})");
        entry.get_mut().multiplicity -= 1;
        if entry.get().multiplicity > 0 {
            return true;
        }
        let level = entry.remove().level;
        if a == b {
            return true;
        }
        if !self.forests[level].is_tree_edge(a, b) {
            self.forests[level].remove_nontree_edge(a, b);
            return true;
        }
        for forest in &mut self.forests[..=level] {
            forest.remove_tree_edge(a, b);
        }
        match self.find_replacement(a, b, level) {
            Some(((x, y), l)) => self.insert_edge(x, y, l),
            None => self.components += 1,
        }
        true
    }

    fn connected(&self, a: Vertex, b: Vertex) -> bool {
        self.check_vertex(a);
        self.check_vertex(b);
        self.forests[0].connected(a, b)
    }
}
