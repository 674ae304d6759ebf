use std::rc::Rc;

use serde::Deserialize;
use thiserror::Error;

/// Index into [`Catalog::nodes`], stable across sessions.
pub type NodeId = usize;

/// The joints tracked for each player, in catalog order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyPart {
	LeftToe,
	LeftHeel,
	LeftAnkle,
	LeftKnee,
	LeftHip,
	LeftShoulder,
	LeftElbow,
	LeftWrist,
	LeftHand,
	LeftFingers,
	RightToe,
	RightHeel,
	RightAnkle,
	RightKnee,
	RightHip,
	RightShoulder,
	RightElbow,
	RightWrist,
	RightHand,
	RightFingers,
	Core,
	Neck,
	Head,
}

impl BodyPart {
	pub const COUNT: usize = 23;

	pub const ALL: [BodyPart; Self::COUNT] = [
		BodyPart::LeftToe,
		BodyPart::LeftHeel,
		BodyPart::LeftAnkle,
		BodyPart::LeftKnee,
		BodyPart::LeftHip,
		BodyPart::LeftShoulder,
		BodyPart::LeftElbow,
		BodyPart::LeftWrist,
		BodyPart::LeftHand,
		BodyPart::LeftFingers,
		BodyPart::RightToe,
		BodyPart::RightHeel,
		BodyPart::RightAnkle,
		BodyPart::RightKnee,
		BodyPart::RightHip,
		BodyPart::RightShoulder,
		BodyPart::RightElbow,
		BodyPart::RightWrist,
		BodyPart::RightHand,
		BodyPart::RightFingers,
		BodyPart::Core,
		BodyPart::Neck,
		BodyPart::Head,
	];

	/// The same joint on the opposite side; axial joints map to themselves.
	pub fn opposite(self) -> BodyPart {
		let i = self as usize;
		match i {
			0..=9 => Self::ALL[i + 10],
			10..=19 => Self::ALL[i - 10],
			_ => self,
		}
	}
}

/// 3D coordinate. Mirrors the small vector surface the camera math needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "[f32; 3]")]
pub struct V3 {
	pub x: f32,
	pub y: f32,
	pub z: f32,
}

impl From<[f32; 3]> for V3 {
	fn from([x, y, z]: [f32; 3]) -> Self {
		Self { x, y, z }
	}
}

impl V3 {
	pub fn add(self, o: V3) -> V3 {
		V3 { x: self.x + o.x, y: self.y + o.y, z: self.z + o.z }
	}

	pub fn subtract(self, o: V3) -> V3 {
		V3 { x: self.x - o.x, y: self.y - o.y, z: self.z - o.z }
	}

	pub fn scale(self, f: f32) -> V3 {
		V3 { x: self.x * f, y: self.y * f, z: self.z * f }
	}

	pub fn lerp(self, o: V3, t: f32) -> V3 {
		self.add(o.subtract(self).scale(t))
	}

	pub fn distance_to(self, o: V3) -> f32 {
		let d = self.subtract(o);
		(d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
	}
}

/// Joint coordinates for one player, ordered as [`BodyPart::ALL`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "Vec<V3>")]
pub struct PlayerPose {
	joints: [V3; BodyPart::COUNT],
}

impl PlayerPose {
	pub fn new(joints: [V3; BodyPart::COUNT]) -> Self {
		Self { joints }
	}

	pub fn get(&self, part: BodyPart) -> V3 {
		self.joints[part as usize]
	}

	pub fn set(&mut self, part: BodyPart, v: V3) {
		self.joints[part as usize] = v;
	}
}

impl TryFrom<Vec<V3>> for PlayerPose {
	type Error = String;

	fn try_from(v: Vec<V3>) -> Result<Self, Self::Error> {
		let n = v.len();
		let joints: [V3; BodyPart::COUNT] = v
			.try_into()
			.map_err(|_| format!("expected {} joints, got {}", BodyPart::COUNT, n))?;
		Ok(Self { joints })
	}
}

/// A full body-position keyframe: one [`PlayerPose`] per player.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Pose {
	pub players: [PlayerPose; 2],
}

impl Pose {
	/// Reflection about the sagittal plane: x negates, left and right
	/// joints swap. Involutive.
	pub fn mirrored(&self) -> Pose {
		let reflect = |p: &PlayerPose| {
			let mut out = p.clone();
			for part in BodyPart::ALL {
				let src = p.get(part.opposite());
				out.set(part, V3 { x: -src.x, ..src });
			}
			out
		};
		Pose { players: [reflect(&self.players[0]), reflect(&self.players[1])] }
	}

	/// Per-joint blend toward `target`; `t` in [0, 1].
	pub fn blend_toward(&mut self, target: &Pose, t: f32) {
		for (pl, tpl) in self.players.iter_mut().zip(&target.players) {
			for part in BodyPart::ALL {
				pl.set(part, pl.get(part).lerp(tpl.get(part), t));
			}
		}
	}

	/// Largest joint displacement between this pose and `target`.
	pub fn distance_to(&self, target: &Pose) -> f32 {
		self.players
			.iter()
			.zip(&target.players)
			.flat_map(|(pl, tpl)| {
				BodyPart::ALL.iter().map(move |&part| pl.get(part).distance_to(tpl.get(part)))
			})
			.fold(0.0, f32::max)
	}
}

/// One catalog entry: a static position plus its descriptive tags.
#[derive(Clone, Debug, Deserialize)]
pub struct PositionNode {
	pub id: NodeId,
	pub pose: Pose,
	#[serde(default)]
	pub tags: Vec<String>,
	/// Short display caption.
	#[serde(default)]
	pub line: Option<String>,
}

/// Transition-local adjustment applied when entering or leaving a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Reorientation {
	#[serde(default)]
	pub mirror: bool,
	#[serde(default)]
	pub swap_players: bool,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Endpoint {
	pub node: NodeId,
	#[serde(default)]
	pub reorientation: Reorientation,
}

/// A directed movement between two positions.
#[derive(Clone, Debug, Deserialize)]
pub struct Transition {
	pub from: Endpoint,
	pub to: Endpoint,
	#[serde(default)]
	pub properties: Vec<String>,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
	#[error("catalog parse error: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("catalog has no nodes")]
	Empty,
	#[error("node at index {index} carries id {id}")]
	IdMismatch { index: usize, id: NodeId },
	#[error("transition {transition} references missing node {node}")]
	DanglingEndpoint { transition: usize, node: NodeId },
}

/// The read-only technique catalog: positions and the movements
/// connecting them.
#[derive(Clone, Debug, Deserialize)]
pub struct Catalog {
	pub nodes: Vec<PositionNode>,
	pub transitions: Vec<Transition>,
}

impl Catalog {
	pub fn from_json(json: &str) -> Result<Rc<Catalog>, CatalogError> {
		let catalog: Catalog = serde_json::from_str(json)?;
		catalog.validate()?;
		Ok(Rc::new(catalog))
	}

	/// Nodes must be indexable by id and every endpoint must resolve.
	fn validate(&self) -> Result<(), CatalogError> {
		if self.nodes.is_empty() {
			return Err(CatalogError::Empty);
		}
		for (index, node) in self.nodes.iter().enumerate() {
			if node.id != index {
				return Err(CatalogError::IdMismatch { index, id: node.id });
			}
		}
		for (i, t) in self.transitions.iter().enumerate() {
			for node in [t.from.node, t.to.node] {
				if node >= self.nodes.len() {
					return Err(CatalogError::DanglingEndpoint { transition: i, node });
				}
			}
		}
		Ok(())
	}

	pub fn node(&self, id: NodeId) -> &PositionNode {
		&self.nodes[id]
	}
}
