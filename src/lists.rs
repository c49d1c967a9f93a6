use std::fmt::Debug;

use crate::violation::Violation;

pub mod avl;

/// Handle of a node, stable from `create` until `free`.
pub type Idx = usize;

/// A collection of disjoint ordered lists, each node carrying data and each list carrying the
/// aggregate of its nodes' data.
///
/// There are no keys: lists are only rearranged by splitting and merging, so what matters is the
/// relative order of the nodes. Operations on a node that doesn't exist panic.
pub trait Lists<Ag = ()>
where
    Ag: AggregatedData,
    Self: Debug,
{
    /// Stands for "no node", and for the empty list.
    const EMPTY: Idx;
    /// Empty collection with room for `capacity` nodes.
    fn new(capacity: usize) -> Self;
    /// Collection holding a single list with the given data, in order. Nodes are numbered from 0.
    fn from_iter(data: impl IntoIterator<Item = Ag::Data>) -> Self
    where
        Self: Sized,
    {
        let data = data.into_iter();
        let mut lists = Self::new(data.size_hint().0);
        let mut root = Self::EMPTY;
        for data in data {
            let u = lists.create(data);
            root = lists.concat(root, u);
        }
        lists
    }
    /// New node alone in its list.
    fn create(&mut self, data: Ag::Data) -> Idx;
    /// Releases u, which must be alone in its list. A later `create` may hand out the same index.
    fn free(&mut self, u: Idx);
    /// Number of nodes that were created and not freed.
    fn total_size(&self) -> usize;

    /// Representative of the list containing u, shared by all its nodes until the list changes.
    fn root(&self, u: Idx) -> Idx;
    fn data(&self, u: Idx) -> &Ag::Data;
    /// Changes the data of u, keeping the aggregates of its list up to date.
    fn mutate_data(&mut self, u: Idx, f: impl FnOnce(&mut Ag::Data));
    /// 0-indexed position of u in its list.
    fn order(&self, u: Idx) -> usize;
    /// Node at position k of the list containing u, or EMPTY if the list is shorter.
    fn find_kth(&self, u: Idx, k: usize) -> Idx;
    /// Walks down from the root of the list containing u, as told by the strategy. Returns the
    /// node where it answered `Found`, or EMPTY.
    fn find_element(
        &self,
        u: Idx,
        search_strategy: impl FnMut(SearchData<'_, Ag>) -> SearchDirection,
    ) -> Idx;
    /// Number of nodes in the list containing u. 0 for EMPTY.
    fn len(&self, u: Idx) -> usize;
    /// Aggregate of the whole list containing u.
    fn total_agg(&self, u: Idx) -> Ag;

    fn on_same_list(&self, u: Idx, v: Idx) -> bool {
        self.root(u) == self.root(v)
    }
    fn is_root(&self, u: Idx) -> bool {
        self.root(u) == u
    }
    fn first(&self, u: Idx) -> Idx {
        self.find_kth(u, 0)
    }
    fn is_first(&self, u: Idx) -> bool {
        u == self.first(u)
    }
    fn is_last(&self, u: Idx) -> bool {
        self.order(u) + 1 == self.len(u)
    }
    /// Successor of u, or EMPTY at the end.
    fn next(&self, u: Idx) -> Idx {
        self.find_kth(u, self.order(u) + 1)
    }
    /// Predecessor of u, or EMPTY at the start.
    fn prev(&self, u: Idx) -> Idx {
        match self.order(u) {
            0 => Self::EMPTY,
            k => self.find_kth(u, k - 1),
        }
    }

    /// Concatenates, in order, the list containing `left`, the single node `middle` and the list
    /// containing `right`. Any of them may be EMPTY. `middle` must be alone in its list. Returns
    /// the new root.
    fn merge(&mut self, left: Idx, middle: Idx, right: Idx) -> Idx;
    /// Appends the list of v to the list of u. Returns the new root.
    fn concat(&mut self, u: Idx, v: Idx) -> Idx {
        self.merge(u, Self::EMPTY, v)
    }
    /// Concatenates the lists of all given nodes, in order. Returns the new root.
    fn concat_all(&mut self, all: impl IntoIterator<Item = Idx>) -> Idx {
        all.into_iter()
            .fold(Self::EMPTY, |acc, v| self.concat(acc, v))
    }
    /// Splits the list containing u right after u. Returns the roots of (up to and including u,
    /// after u); the second one may be EMPTY.
    fn split(&mut self, u: Idx) -> (Idx, Idx);
    /// Takes u out of its list, leaving it alone in a new list. Returns the root of what remains
    /// of its former list, which may be EMPTY.
    fn unlink(&mut self, u: Idx) -> Idx;

    /// Checks the structure holding the list containing u.
    fn validate(&self, u: Idx) -> Result<(), Violation>;
}

/// Monoid summarizing a range of a list. `merge` is only ever called with `right` describing
/// nodes after those of `self`.
pub trait AggregatedData: Debug + Clone + Default + PartialEq {
    type Data: Debug + Clone;
    /// Aggregate of a single node.
    fn from_data(data: &Self::Data) -> Self;
    fn merge(self, right: Self) -> Self;
}

/// What a search strategy sees at each node it visits.
#[derive(Debug)]
pub struct SearchData<'a, Ag: AggregatedData> {
    pub current_data: &'a Ag::Data,
    /// Aggregate of the nodes before the current one in its subtree.
    pub left_agg: &'a Ag,
    /// Aggregate of the nodes after the current one in its subtree.
    pub right_agg: &'a Ag,
}

#[derive(Debug)]
pub enum SearchDirection {
    Found,
    NotFound,
    Left,
    Right,
}

impl AggregatedData for () {
    type Data = ();
    fn from_data(_: &Self::Data) -> Self {}
    fn merge(self, _: Self) -> Self {}
}
