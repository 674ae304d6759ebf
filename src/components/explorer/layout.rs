use std::collections::HashMap;
use std::f32::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::NodeId;

/// Simulation steps run synchronously before a freshly derived subgraph
/// is first painted. A fixed count, not a convergence check.
pub const STABILIZE_TICKS: usize = 30;

pub const NODE_RADIUS: f64 = 6.0;
pub const HIT_RADIUS: f64 = 14.0;

/// One node as handed to the layout engine. `seed` carries the 2D
/// coordinate from an earlier layout of the same node, if any.
#[derive(Clone, Debug)]
pub struct LayoutNode {
	pub id: NodeId,
	pub label: Option<String>,
	pub seed: Option<(f32, f32)>,
	pub pinned: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutLink {
	pub from: NodeId,
	pub to: NodeId,
}

/// The incremental physics simulation the stabilizer drives. The
/// production implementation is [`ForceLayout`]; tests substitute
/// scripted engines.
pub trait LayoutEngine {
	fn set_nodes(&mut self, nodes: Vec<LayoutNode>);
	fn set_links(&mut self, links: Vec<LayoutLink>);
	fn start(&mut self);
	/// One discrete simulation step.
	fn tick(&mut self);
	/// Unmark every pinned node so user-driven physics behaves normally.
	fn release_pins(&mut self);
	fn position(&self, id: NodeId) -> Option<(f32, f32)>;
}

/// Drive `engine` to a stable configuration for the given subgraph:
/// pin every node that already has a coordinate, load, start, advance
/// exactly [`STABILIZE_TICKS`] steps, release the pins. Pinned nodes
/// come out with their prior coordinates untouched.
pub fn stabilize<E: LayoutEngine + ?Sized>(
	engine: &mut E,
	mut nodes: Vec<LayoutNode>,
	links: Vec<LayoutLink>,
) {
	for n in &mut nodes {
		n.pinned = n.seed.is_some();
	}
	engine.set_nodes(nodes);
	engine.set_links(links);
	engine.start();
	for _ in 0..STABILIZE_TICKS {
		engine.tick();
	}
	engine.release_pins();
}

#[derive(Clone, Debug, Default)]
pub struct NodeBadge {
	pub id: NodeId,
	pub label: Option<String>,
}

/// Force-directed layout over the `force_graph` crate. Pinned nodes map
/// to the simulation's anchor flag; nodes without a seed coordinate
/// start on a small circle around the origin.
pub struct ForceLayout {
	graph: ForceGraph<NodeBadge, ()>,
	id_to_idx: HashMap<NodeId, DefaultNodeIdx>,
	pending_nodes: Vec<LayoutNode>,
	pending_links: Vec<LayoutLink>,
}

impl ForceLayout {
	pub fn new() -> Self {
		Self {
			graph: Self::empty_graph(),
			id_to_idx: HashMap::new(),
			pending_nodes: Vec::new(),
			pending_links: Vec::new(),
		}
	}

	fn empty_graph() -> ForceGraph<NodeBadge, ()> {
		ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		})
	}

	/// Current coordinate of every laid-out node.
	pub fn positions(&self) -> HashMap<NodeId, (f32, f32)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.data.user_data.id, (node.x(), node.y()));
		});
		out
	}

	/// Hit test in graph coordinates.
	pub fn node_at(&self, gx: f64, gy: f64) -> Option<NodeId> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.data.user_data.id);
			}
		});
		found
	}

	/// Move a node under the pointer and anchor it there.
	pub fn drag_to(&mut self, id: NodeId, x: f32, y: f32) {
		if let Some(&idx) = self.id_to_idx.get(&id) {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = x;
					node.data.y = y;
					node.data.is_anchor = true;
				}
			});
		}
	}
}

impl Default for ForceLayout {
	fn default() -> Self {
		Self::new()
	}
}

impl LayoutEngine for ForceLayout {
	fn set_nodes(&mut self, nodes: Vec<LayoutNode>) {
		self.pending_nodes = nodes;
	}

	fn set_links(&mut self, links: Vec<LayoutLink>) {
		self.pending_links = links;
	}

	fn start(&mut self) {
		self.graph = Self::empty_graph();
		self.id_to_idx.clear();

		let count = self.pending_nodes.len().max(1);
		for (i, n) in self.pending_nodes.iter().enumerate() {
			let angle = (i as f32) * 2.0 * PI / count as f32;
			let (x, y) = n.seed.unwrap_or((100.0 * angle.cos(), 100.0 * angle.sin()));
			let idx = self.graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: n.pinned,
				user_data: NodeBadge { id: n.id, label: n.label.clone() },
			});
			self.id_to_idx.insert(n.id, idx);
		}

		for link in &self.pending_links {
			if let (Some(&src), Some(&tgt)) =
				(self.id_to_idx.get(&link.from), self.id_to_idx.get(&link.to))
			{
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
		}
	}

	fn tick(&mut self) {
		self.graph.update(1.0 / 60.0);
	}

	fn release_pins(&mut self) {
		self.graph.visit_nodes_mut(|node| {
			node.data.is_anchor = false;
		});
	}

	fn position(&self, id: NodeId) -> Option<(f32, f32)> {
		let idx = *self.id_to_idx.get(&id)?;
		let mut pos = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pos = Some((node.x(), node.y()));
			}
		});
		pos
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Records the call protocol and moves every unpinned node one unit
	/// per tick, which is enough to observe pinning and tick counts.
	#[derive(Default)]
	struct ScriptedEngine {
		nodes: Vec<LayoutNode>,
		coords: HashMap<NodeId, (f32, f32)>,
		calls: Vec<&'static str>,
	}

	impl LayoutEngine for ScriptedEngine {
		fn set_nodes(&mut self, nodes: Vec<LayoutNode>) {
			self.calls.push("set_nodes");
			self.coords = nodes
				.iter()
				.map(|n| (n.id, n.seed.unwrap_or((0.0, 0.0))))
				.collect();
			self.nodes = nodes;
		}

		fn set_links(&mut self, _links: Vec<LayoutLink>) {
			self.calls.push("set_links");
		}

		fn start(&mut self) {
			self.calls.push("start");
		}

		fn tick(&mut self) {
			self.calls.push("tick");
			for n in &self.nodes {
				if !n.pinned {
					let c = self.coords.get_mut(&n.id).unwrap();
					c.0 += 1.0;
				}
			}
		}

		fn release_pins(&mut self) {
			self.calls.push("release_pins");
			for n in &mut self.nodes {
				n.pinned = false;
			}
		}

		fn position(&self, id: NodeId) -> Option<(f32, f32)> {
			self.coords.get(&id).copied()
		}
	}

	fn free(id: NodeId) -> LayoutNode {
		LayoutNode { id, label: None, seed: None, pinned: false }
	}

	fn seeded(id: NodeId, x: f32, y: f32) -> LayoutNode {
		LayoutNode { id, label: None, seed: Some((x, y)), pinned: false }
	}

	#[test]
	fn protocol_order_and_exact_tick_count() {
		let mut engine = ScriptedEngine::default();
		stabilize(&mut engine, vec![free(0)], vec![]);

		assert_eq!(&engine.calls[..3], &["set_nodes", "set_links", "start"]);
		let ticks = engine.calls.iter().filter(|&&c| c == "tick").count();
		assert_eq!(ticks, STABILIZE_TICKS);
		assert_eq!(engine.calls.last(), Some(&"release_pins"));
	}

	#[test]
	fn seeded_nodes_are_pinned_for_the_pass_and_released_after() {
		let mut engine = ScriptedEngine::default();
		stabilize(&mut engine, vec![seeded(0, 3.0, 4.0), free(1)], vec![]);

		assert_eq!(engine.position(0), Some((3.0, 4.0)));
		assert_eq!(engine.position(1), Some((30.0, 0.0)));
		assert!(engine.nodes.iter().all(|n| !n.pinned));
	}

	#[test]
	fn force_layout_preserves_pinned_coordinates_exactly() {
		let mut engine = ForceLayout::new();
		stabilize(
			&mut engine,
			vec![seeded(0, 12.5, -40.0), free(1), free(2)],
			vec![LayoutLink { from: 0, to: 1 }, LayoutLink { from: 1, to: 2 }],
		);

		assert_eq!(engine.position(0), Some((12.5, -40.0)));
		assert!(engine.position(1).is_some());
	}

	#[test]
	fn force_layout_separates_free_nodes() {
		let mut engine = ForceLayout::new();
		stabilize(
			&mut engine,
			vec![free(0), free(1)],
			vec![LayoutLink { from: 0, to: 1 }],
		);

		let (a, b) = (engine.position(0).unwrap(), engine.position(1).unwrap());
		let dist = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
		assert!(dist > 1.0, "nodes should not collapse onto each other");
	}
}
