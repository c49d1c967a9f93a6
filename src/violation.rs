use thiserror::Error;

use crate::lists::Idx;

/// A broken invariant, found by one of the `validate`/`check` methods. Never produced by a
/// correct implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("node {node} does not point back to its parent")]
    ParentLink { node: Idx },
    #[error("node {node} is reachable but was freed")]
    FreedNode { node: Idx },
    #[error("node {node} has children of heights {left} and {right}")]
    Unbalanced { node: Idx, left: usize, right: usize },
    #[error("node {node} stores height {stored}, expected {expected}")]
    Height {
        node: Idx,
        stored: usize,
        expected: usize,
    },
    #[error("node {node} stores size {stored}, expected {expected}")]
    Size {
        node: Idx,
        stored: usize,
        expected: usize,
    },
    #[error("node {node} stores aggregate {stored}, expected {expected}")]
    Aggregate {
        node: Idx,
        stored: String,
        expected: String,
    },
    #[error("node of vertex {vertex} holds the wrong data")]
    VertexNode { vertex: usize },
    #[error("tour of vertex {vertex} has {len} nodes for {size} vertices")]
    TourShape {
        vertex: usize,
        len: usize,
        size: usize,
    },
    #[error("tree edge ({a}, {b}) is stored inconsistently")]
    TreeEdge { a: usize, b: usize },
    #[error("non-tree edge ({a}, {b}) is stored inconsistently")]
    NontreeEdge { a: usize, b: usize },
    #[error("{registered} {kind} edges are registered but the tours hold {stored}")]
    RegistryCount {
        kind: &'static str,
        registered: usize,
        stored: usize,
    },
    #[error("edge ({a}, {b}) of level {level} is misplaced in forest {forest}")]
    EdgeLevel {
        a: usize,
        b: usize,
        level: usize,
        forest: usize,
    },
    #[error("forest {level} holds edge ({a}, {b}), which is not recorded")]
    UnknownEdge { a: usize, b: usize, level: usize },
    #[error("tree edge ({a}, {b}) of forest {level} is missing from the forest below")]
    Nesting { a: usize, b: usize, level: usize },
    #[error("component of vertex {vertex} in forest {level} has {size} vertices, at most {max} allowed")]
    ComponentSize {
        level: usize,
        vertex: usize,
        size: usize,
        max: usize,
    },
    #[error("{stored} components are counted but there are {actual}")]
    ComponentCount { stored: usize, actual: usize },
}
