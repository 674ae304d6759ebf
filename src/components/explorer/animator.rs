use std::rc::Rc;

use super::types::{Catalog, NodeId, Pose};

const BLEND_RATE: f32 = 6.0;
const SNAP_DISTANCE: f32 = 0.01;

/// The pose interpolation subsystem the explorer drives. `try_move` is
/// advisory: the implementation may refuse while a blend is in flight.
pub trait PoseAnimator {
	fn try_move(&mut self, target: NodeId) -> bool;
	/// Reflect the current target pose about the sagittal plane.
	fn mirror(&mut self);
	/// The pose currently on display.
	fn pose(&self) -> &Pose;
	/// Advance the blend; returns true while the pose is still moving.
	fn advance(&mut self, dt: f32) -> bool;
}

/// Exponential approach of the displayed pose toward the target node's
/// stored pose, snapping once every joint is close.
pub struct PoseBlender {
	catalog: Rc<Catalog>,
	shown: Pose,
	keyframe: Pose,
	blending: bool,
	mirrored: bool,
}

impl PoseBlender {
	pub fn new(catalog: Rc<Catalog>, initial: NodeId) -> Self {
		let pose = catalog.node(initial).pose.clone();
		Self {
			catalog,
			shown: pose.clone(),
			keyframe: pose,
			blending: false,
			mirrored: false,
		}
	}
}

impl PoseAnimator for PoseBlender {
	fn try_move(&mut self, target: NodeId) -> bool {
		if self.blending {
			return false;
		}
		let pose = &self.catalog.node(target).pose;
		self.keyframe = if self.mirrored { pose.mirrored() } else { pose.clone() };
		self.blending = true;
		true
	}

	fn mirror(&mut self) {
		self.keyframe = self.keyframe.mirrored();
		self.mirrored = !self.mirrored;
		self.blending = true;
	}

	fn pose(&self) -> &Pose {
		&self.shown
	}

	fn advance(&mut self, dt: f32) -> bool {
		if !self.blending {
			return false;
		}
		let t = (BLEND_RATE * dt).min(1.0);
		self.shown.blend_toward(&self.keyframe, t);
		if self.shown.distance_to(&self.keyframe) < SNAP_DISTANCE {
			self.shown = self.keyframe.clone();
			self.blending = false;
		}
		self.blending
	}
}
