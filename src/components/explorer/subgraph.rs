use std::collections::HashSet;

use super::selection::Selection;
use super::types::{Catalog, NodeId};

/// Edge color by property precedence: "top" wins over "bottom".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeColor {
	Red,
	Blue,
	Black,
}

impl EdgeColor {
	pub fn of(properties: &[String]) -> EdgeColor {
		if properties.iter().any(|p| p == "top") {
			EdgeColor::Red
		} else if properties.iter().any(|p| p == "bottom") {
			EdgeColor::Blue
		} else {
			EdgeColor::Black
		}
	}

	pub fn as_css(self) -> &'static str {
		match self {
			EdgeColor::Red => "#d62728",
			EdgeColor::Blue => "#1f77b4",
			EdgeColor::Black => "#111111",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleEdge {
	pub from: NodeId,
	pub to: NodeId,
	/// Index back into the catalog's transition list.
	pub transition: usize,
	pub color: EdgeColor,
}

/// The node/edge set actually rendered. Node order follows selection
/// insertion order, then catalog order for edit-mode neighbors.
#[derive(Clone, Debug, Default)]
pub struct VisibleSubgraph {
	pub nodes: Vec<NodeId>,
	pub edges: Vec<VisibleEdge>,
}

impl VisibleSubgraph {
	pub fn contains(&self, id: NodeId) -> bool {
		self.nodes.contains(&id)
	}
}

/// Derive the visible subgraph from the current selection.
///
/// Two passes over the transition list, in this order:
/// 1. with edit mode on, every transition touching a *selected* node
///    contributes both of its endpoints to the visible node set;
/// 2. every transition whose endpoints are both visible (including
///    nodes the first pass added) becomes a colored visible edge.
///
/// Pass 2 must run after pass 1 completes: two neighbors pulled in by
/// pass 1 can qualify an edge between each other that no selected node
/// touches.
pub fn derive(catalog: &Catalog, selection: &Selection, edit_mode: bool) -> VisibleSubgraph {
	let mut nodes: Vec<NodeId> = Vec::new();
	let mut seen: HashSet<NodeId> = HashSet::new();
	let mut add = |nodes: &mut Vec<NodeId>, n: NodeId| {
		if seen.insert(n) {
			nodes.push(n);
		}
	};

	for &n in selection.ids() {
		add(&mut nodes, n);
	}

	if edit_mode {
		for t in &catalog.transitions {
			if selection.contains(t.from.node) || selection.contains(t.to.node) {
				add(&mut nodes, t.from.node);
				add(&mut nodes, t.to.node);
			}
		}
	}

	let mut edges = Vec::new();
	for (i, t) in catalog.transitions.iter().enumerate() {
		if seen.contains(&t.from.node) && seen.contains(&t.to.node) {
			edges.push(VisibleEdge {
				from: t.from.node,
				to: t.to.node,
				transition: i,
				color: EdgeColor::of(&t.properties),
			});
		}
	}

	VisibleSubgraph { nodes, edges }
}

#[cfg(test)]
mod tests {
	use super::super::types::tests::flat_pose;
	use super::super::types::{Endpoint, PositionNode, Reorientation, Transition};
	use super::*;

	fn catalog(n: usize, transitions: &[(NodeId, NodeId, &[&str])]) -> Catalog {
		Catalog {
			nodes: (0..n)
				.map(|id| PositionNode {
					id,
					pose: flat_pose(id as f32),
					tags: vec![format!("tag{id}")],
					line: None,
				})
				.collect(),
			transitions: transitions
				.iter()
				.map(|&(from, to, props)| Transition {
					from: Endpoint { node: from, reorientation: Reorientation::default() },
					to: Endpoint { node: to, reorientation: Reorientation::default() },
					properties: props.iter().map(|p| p.to_string()).collect(),
					description: None,
				})
				.collect(),
		}
	}

	fn selection_of(ids: &[NodeId]) -> Selection {
		let mut s = Selection::default();
		s.restore(ids.iter().copied(), || unreachable!());
		s
	}

	#[test]
	fn unselected_endpoint_hides_the_edge() {
		let c = catalog(3, &[(0, 1, &["top"])]);
		let g = derive(&c, &selection_of(&[0]), false);
		assert_eq!(g.nodes, vec![0]);
		assert!(g.edges.is_empty());
	}

	#[test]
	fn edit_mode_pulls_in_neighbors_and_their_edge() {
		let c = catalog(3, &[(0, 1, &["top"])]);
		let g = derive(&c, &selection_of(&[0]), true);
		assert_eq!(g.nodes, vec![0, 1]);
		assert_eq!(
			g.edges,
			vec![VisibleEdge { from: 0, to: 1, transition: 0, color: EdgeColor::Red }]
		);
	}

	#[test]
	fn neighbors_of_the_selection_qualify_edges_among_themselves() {
		// 1 and 2 are both neighbors of selected node 0; the 1->2 edge
		// only becomes visible because neighbor expansion runs first.
		let c = catalog(3, &[(0, 1, &[]), (2, 0, &[]), (1, 2, &[])]);
		let g = derive(&c, &selection_of(&[0]), true);
		assert_eq!(g.nodes, vec![0, 1, 2]);
		let pairs: Vec<_> = g.edges.iter().map(|e| (e.from, e.to)).collect();
		assert_eq!(pairs, vec![(0, 1), (2, 0), (1, 2)]);
	}

	#[test]
	fn neighbor_expansion_tests_the_selection_not_the_grown_set() {
		// 2 is a neighbor-of-a-neighbor: visible node 1 touches it, but
		// no selected node does, so it stays hidden.
		let c = catalog(3, &[(0, 1, &[]), (1, 2, &[])]);
		let g = derive(&c, &selection_of(&[0]), true);
		assert_eq!(g.nodes, vec![0, 1]);
	}

	#[test]
	fn every_edge_endpoint_is_a_visible_node() {
		let c = catalog(
			5,
			&[(0, 1, &[]), (1, 2, &["bottom"]), (2, 3, &[]), (3, 4, &["top"]), (4, 0, &[])],
		);
		for edit_mode in [false, true] {
			for sel in [vec![0], vec![1, 3], vec![0, 1, 2, 3, 4]] {
				let g = derive(&c, &selection_of(&sel), edit_mode);
				for e in &g.edges {
					assert!(g.contains(e.from) && g.contains(e.to));
				}
			}
		}
	}

	#[test]
	fn top_outranks_bottom() {
		assert_eq!(EdgeColor::of(&["top".into(), "bottom".into()]), EdgeColor::Red);
		assert_eq!(EdgeColor::of(&["bottom".into()]), EdgeColor::Blue);
		assert_eq!(EdgeColor::of(&["sweep".into()]), EdgeColor::Black);
	}

	#[test]
	fn selected_nodes_keep_insertion_order() {
		let c = catalog(4, &[]);
		let g = derive(&c, &selection_of(&[2, 0, 3]), false);
		assert_eq!(g.nodes, vec![2, 0, 3]);
	}
}
