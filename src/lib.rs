//! Fully dynamic connectivity on undirected graphs with a fixed vertex set.
//!
//! Built in three layers: [`lists::avl::AvlTrees`] keeps ordered lists as AVL trees with
//! aggregated data, [`euler_tour_forest::EulerTourForest`] stores a forest as Euler tours in those
//! lists, and [`HdtConnectivity`] layers O(log n) such forests to answer connectivity queries under
//! edge insertions and deletions.
pub mod dynamic_connectivity;
pub mod euler_tour_forest;
pub mod lists;
pub mod violation;
pub use dynamic_connectivity::{DynamicConnectivity, HdtConnectivity};
pub use violation::Violation;

use euler_tour_forest::EtAg;
use lists::avl::AvlTrees;

/// The fastest implemented solver for dynamic connectivity on this crate.
pub type FastConnectivity = HdtConnectivity<AvlTrees<EtAg>>;
