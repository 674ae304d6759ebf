use super::types::{BodyPart, Pose, V3};

/// Rotation slider units map linearly onto the external camera azimuth.
pub const CAMERA_AZIMUTH_SCALE: f32 = 0.16;

/// Which camera looks at the scene: the orbiting external one, or the
/// eyes of one of the two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
	External,
	FirstPerson(usize),
}

impl ViewMode {
	/// View-selector values: "external", or a player index.
	pub fn parse(value: &str) -> ViewMode {
		match value.parse::<usize>() {
			Ok(player) if player < 2 => ViewMode::FirstPerson(player),
			_ => ViewMode::External,
		}
	}
}

/// Position/orientation handed to the scene camera. Derived from the
/// displayed pose, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
	pub position: V3,
	pub up: V3,
	pub target: V3,
}

/// Look out of `player`'s eyes: positioned at the head, oriented along
/// head minus neck, aimed at the midpoint of the two hands' fingers.
pub fn first_person(pose: &Pose, player: usize) -> CameraFrame {
	let p = &pose.players[player];
	CameraFrame {
		position: p.get(BodyPart::Head),
		up: p.get(BodyPart::Head).subtract(p.get(BodyPart::Neck)),
		target: p
			.get(BodyPart::LeftFingers)
			.add(p.get(BodyPart::RightFingers))
			.scale(0.5),
	}
}

pub fn azimuth_for(slider: i32) -> f32 {
	slider as f32 * CAMERA_AZIMUTH_SCALE
}
