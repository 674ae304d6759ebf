use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use super::animator::PoseAnimator;
use super::camera::{CameraFrame, ViewMode, first_person};
use super::layout::{LayoutEngine, LayoutLink, LayoutNode, stabilize};
use super::persistence::{self, LocationStore, PersistOutcome};
use super::selection::Selection;
use super::subgraph::{self, VisibleSubgraph};
use super::types::{Catalog, NodeId, Pose};

/// Edit mode switches itself on while the selection is this small, so
/// a freshly opened single-position view is immediately extendable.
const AUTO_EDIT_LIMIT: usize = 5;

/// Derived navigation targets for the focused node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkTargets {
	pub search: String,
	pub composer: String,
}

/// One explorer view session: the selection, the derived subgraph, the
/// layout engine and its memory of past coordinates, the pose animator,
/// and the shareable location. Constructed once the external engine
/// reports ready, torn down with the view.
pub struct ExplorerSession<L, A, S> {
	catalog: Rc<Catalog>,
	selection: Selection,
	edit_mode: bool,
	visible: VisibleSubgraph,
	layout_memory: HashMap<NodeId, (f32, f32)>,
	engine: L,
	animator: A,
	location: S,
	links: LinkTargets,
	mirrored: bool,
	view: ViewMode,
}

impl<L, A, S> ExplorerSession<L, A, S>
where
	L: LayoutEngine,
	A: PoseAnimator,
	S: LocationStore,
{
	/// Restore the selection from the shareable location (or fall back
	/// to a single node from `fallback`), then run the derivation
	/// pipeline once so the first paint sees a stabilized diagram.
	pub fn boot(
		catalog: Rc<Catalog>,
		engine: L,
		location: S,
		fallback: impl FnOnce() -> NodeId,
		make_animator: impl FnOnce(NodeId) -> A,
	) -> Self {
		let mut ids = location
			.read_suffix()
			.map(|s| persistence::decode(&s))
			.unwrap_or_default();
		// Ids from a stale or hand-edited link may not exist anymore.
		ids.retain(|&id| id < catalog.nodes.len());

		let mut selection = Selection::default();
		selection.restore(ids, fallback);
		let focused = selection.focused().expect("restore leaves at least one node");
		info!("session starts at node {focused} with {} selected", selection.len());

		let mut session = Self {
			animator: make_animator(focused),
			edit_mode: selection.len() <= AUTO_EDIT_LIMIT,
			catalog,
			selection,
			visible: VisibleSubgraph::default(),
			layout_memory: HashMap::new(),
			engine,
			location,
			links: LinkTargets::default(),
			mirrored: false,
			view: ViewMode::External,
		};
		session.selection_changed();
		session
	}

	/// The full reaction to a selection mutation, synchronous and in
	/// this order: derive the visible subgraph, stabilize its layout
	/// (seeding nodes laid out earlier this session), refresh the
	/// derived view state, persist the selection.
	fn selection_changed(&mut self) -> PersistOutcome {
		self.visible = subgraph::derive(&self.catalog, &self.selection, self.edit_mode);

		let nodes = self
			.visible
			.nodes
			.iter()
			.map(|&id| LayoutNode {
				id,
				label: self.catalog.node(id).line.clone(),
				seed: self.layout_memory.get(&id).copied(),
				pinned: false,
			})
			.collect();
		let links = self
			.visible
			.edges
			.iter()
			.map(|e| LayoutLink { from: e.from, to: e.to })
			.collect();
		stabilize(&mut self.engine, nodes, links);

		for (id, xy) in self.engine_positions() {
			self.layout_memory.insert(id, xy);
		}
		self.refresh_links();

		let outcome = self
			.location
			.write_suffix(&persistence::encode(self.selection.ids()));
		debug!("selection now {:?}, persistence {outcome:?}", self.selection.ids());
		outcome
	}

	fn engine_positions(&self) -> Vec<(NodeId, (f32, f32))> {
		self.visible
			.nodes
			.iter()
			.filter_map(|&id| self.engine.position(id).map(|xy| (id, xy)))
			.collect()
	}

	fn refresh_links(&mut self) {
		let Some(id) = self.selection.focused() else {
			return;
		};
		let node = self.catalog.node(id);
		self.links = LinkTargets {
			search: format!("../index.html?{}", node.tags.join(",")),
			composer: format!("../composer/index.html?p{id}"),
		};
	}

	/// Click on a visible node: only meaningful in edit mode, where it
	/// toggles selection membership.
	pub fn node_clicked(&mut self, id: NodeId) -> bool {
		if !self.edit_mode || !self.selection.toggle(id) {
			return false;
		}
		if self.selection.len() <= AUTO_EDIT_LIMIT {
			self.edit_mode = true;
		}
		self.selection_changed();
		true
	}

	pub fn set_edit_mode(&mut self, on: bool) {
		self.edit_mode = on;
		self.selection_changed();
	}

	/// Hover-driven pose preview. Asks the animator to blend toward
	/// `id`; on acceptance the focus (and with it the derived links)
	/// follows the pointer. The committed selection and its persisted
	/// form stay untouched.
	pub fn hover(&mut self, id: NodeId) -> bool {
		if self.selection.focused() == Some(id) || !self.visible.contains(id) {
			return false;
		}
		if !self.animator.try_move(id) {
			return false;
		}
		self.selection.set_focus(id);
		self.refresh_links();
		true
	}

	/// Reflect the target pose about the sagittal plane. No effect on
	/// selection, layout, or persisted state.
	pub fn toggle_mirror(&mut self) {
		self.animator.mirror();
		self.mirrored = !self.mirrored;
	}

	/// Per-frame work: gentle diagram relaxation plus pose blending.
	/// Independent of the deterministic pre-paint stabilization.
	/// Returns true while the pose is still moving.
	pub fn frame(&mut self, dt: f32) -> bool {
		self.engine.tick();
		// Layout memory follows the live coordinates, so relaxation and
		// drags carry over into the next derivation's pinned seeds.
		for (id, xy) in self.engine_positions() {
			self.layout_memory.insert(id, xy);
		}
		self.animator.advance(dt)
	}

	pub fn camera_frame(&self) -> Option<CameraFrame> {
		match self.view {
			ViewMode::External => None,
			ViewMode::FirstPerson(player) => Some(first_person(self.animator.pose(), player)),
		}
	}

	pub fn set_view(&mut self, view: ViewMode) {
		self.view = view;
	}

	pub fn view(&self) -> ViewMode {
		self.view
	}

	pub fn pose(&self) -> &Pose {
		self.animator.pose()
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	pub fn visible(&self) -> &VisibleSubgraph {
		&self.visible
	}

	pub fn links(&self) -> &LinkTargets {
		&self.links
	}

	pub fn edit_mode(&self) -> bool {
		self.edit_mode
	}

	pub fn mirrored(&self) -> bool {
		self.mirrored
	}

	pub fn engine(&self) -> &L {
		&self.engine
	}

	pub fn engine_mut(&mut self) -> &mut L {
		&mut self.engine
	}
}
