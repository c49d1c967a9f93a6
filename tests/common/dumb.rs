use std::collections::BTreeMap;

use dynamic_connectivity::DynamicConnectivity;

/// Keeps the multigraph as adjacency maps and answers everything with a graph search.
pub struct Dumb {
    /// adj[u][v] = number of copies of (u, v)
    adj: Vec<BTreeMap<usize, usize>>,
}

impl std::fmt::Debug for Dumb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v_to_id = self.groups();
        let mut gs = vec![vec![]; v_to_id.iter().copied().max().unwrap_or(0)];
        for (v, &id) in v_to_id.iter().enumerate() {
            gs[id - 1].push(v);
        }
        f.debug_struct("Dumb").field("groups", &gs).finish()
    }
}

fn take_one(adj: &mut BTreeMap<usize, usize>, v: usize) -> bool {
    let Some(c) = adj.get_mut(&v) else {
        return false;
    };
    *c -= 1;
    if *c == 0 {
        adj.remove(&v);
    }
    true
}

impl Dumb {
    /// Component id of every vertex, starting from 1.
    pub fn groups(&self) -> Vec<usize> {
        let mut groups = vec![0; self.adj.len()];
        let mut group_id = 0;
        for u in 0..self.adj.len() {
            if groups[u] == 0 {
                group_id += 1;
                groups[u] = group_id;
                let mut stack = vec![u];
                while let Some(u) = stack.pop() {
                    stack.extend(self.adj[u].keys().copied().filter(|&v| {
                        if groups[v] == 0 {
                            groups[v] = group_id;
                            true
                        } else {
                            false
                        }
                    }));
                }
            }
        }
        groups
    }

    pub fn component_count(&self) -> usize {
        self.groups().into_iter().max().unwrap_or(0)
    }

    pub fn edge_multiplicity(&self, a: usize, b: usize) -> usize {
        self.adj[a].get(&b).copied().unwrap_or(0)
    }
}

impl DynamicConnectivity for Dumb {
    fn new(n: usize) -> Self {
        Self {
            adj: vec![BTreeMap::new(); n],
        }
    }

    fn insert(&mut self, a: usize, b: usize) {
        *self.adj[a].entry(b).or_default() += 1;
        if a != b {
            *self.adj[b].entry(a).or_default() += 1;
        }
    }

    fn remove(&mut self, a: usize, b: usize) -> bool {
        if !take_one(&mut self.adj[a], b) {
            return false;
        }
        if a != b {
            take_one(&mut self.adj[b], a);
        }
        true
    }

    fn connected(&self, a: usize, b: usize) -> bool {
        let mut seen = vec![false; self.adj.len()];
        let mut stack = vec![a];
        while let Some(u) = stack.pop() {
            if u == b {
                return true;
            }
            if !std::mem::replace(&mut seen[u], true) {
                stack.extend(self.adj[u].keys().copied());
            }
        }
        false
    }
}
