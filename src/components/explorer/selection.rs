use super::types::NodeId;

/// The ordered set of nodes the user has chosen to inspect, plus the
/// single focused node used for link derivation and hover queries.
///
/// Append order is meaningful: the visible subgraph iterates the
/// selection in insertion order, so two sessions restoring the same
/// id sequence see the same diagram.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	ids: Vec<NodeId>,
	focused: Option<NodeId>,
}

impl Selection {
	pub fn ids(&self) -> &[NodeId] {
		&self.ids
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.ids.contains(&id)
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	pub fn focused(&self) -> Option<NodeId> {
		self.focused
	}

	pub fn set_focus(&mut self, id: NodeId) {
		self.focused = Some(id);
	}

	/// Append `id` if absent; remove it if present and the selection
	/// holds at least two nodes. A sole selected node can not be
	/// removed (the view always has something to show). Returns
	/// whether the selection changed.
	pub fn toggle(&mut self, id: NodeId) -> bool {
		match self.ids.iter().position(|&n| n == id) {
			None => {
				self.ids.push(id);
				true
			}
			Some(i) if self.ids.len() >= 2 => {
				self.ids.remove(i);
				if self.focused == Some(id) {
					self.focused = self.ids.first().copied();
				}
				true
			}
			Some(_) => false,
		}
	}

	/// Wholesale replacement from a persisted id sequence. Duplicates
	/// collapse to their first occurrence; an empty sequence falls back
	/// to a single node supplied by `fallback`. Focus moves to the
	/// first member.
	pub fn restore(&mut self, ids: impl IntoIterator<Item = NodeId>, fallback: impl FnOnce() -> NodeId) {
		self.ids.clear();
		for id in ids {
			if !self.ids.contains(&id) {
				self.ids.push(id);
			}
		}
		if self.ids.is_empty() {
			self.ids.push(fallback());
		}
		self.focused = self.ids.first().copied();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn selection_of(ids: &[NodeId]) -> Selection {
		let mut s = Selection::default();
		s.restore(ids.iter().copied(), || unreachable!());
		s
	}

	#[test]
	fn toggle_twice_restores_original_selection() {
		let mut s = selection_of(&[1, 2]);
		assert!(s.toggle(5));
		assert!(s.toggle(5));
		assert_eq!(s.ids(), &[1, 2]);
	}

	#[test]
	fn toggle_appends_in_order() {
		let mut s = selection_of(&[3]);
		s.toggle(7);
		s.toggle(2);
		assert_eq!(s.ids(), &[3, 7, 2]);
	}

	#[test]
	fn sole_member_can_not_be_removed() {
		let mut s = selection_of(&[4]);
		assert!(!s.toggle(4));
		assert_eq!(s.ids(), &[4]);
	}

	#[test]
	fn removal_permitted_at_size_two() {
		let mut s = selection_of(&[1, 2]);
		assert!(s.toggle(2));
		assert_eq!(s.ids(), &[1]);
	}

	#[test]
	fn removing_the_focused_node_refocuses() {
		let mut s = selection_of(&[1, 2]);
		s.set_focus(2);
		s.toggle(2);
		assert_eq!(s.focused(), Some(1));
	}

	#[test]
	fn restore_collapses_duplicates_keeping_first_occurrence() {
		let mut s = Selection::default();
		s.restore([5, 9, 5], || unreachable!());
		assert_eq!(s.ids(), &[5, 9]);
		assert_eq!(s.focused(), Some(5));
	}

	#[test]
	fn restore_of_nothing_falls_back_to_one_node() {
		let mut s = Selection::default();
		s.restore([], || 11);
		assert_eq!(s.ids(), &[11]);
		assert_eq!(s.focused(), Some(11));
	}
}
