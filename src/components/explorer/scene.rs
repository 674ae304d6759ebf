use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::camera::CameraFrame;
use super::types::{BodyPart, Pose, V3};

const PLAYER_COLORS: [&str; 2] = ["#b53f3f", "#3f5ab5"];
const ORBIT_PITCH: f32 = 0.35;
const ORBIT_RADIUS: f32 = 4.0;
const ORBIT_SCALE: f32 = 140.0;
const FIRST_PERSON_SCALE: f32 = 240.0;

/// Limb segments drawn for each player.
const BONES: &[(BodyPart, BodyPart)] = &[
	(BodyPart::LeftToe, BodyPart::LeftHeel),
	(BodyPart::LeftHeel, BodyPart::LeftAnkle),
	(BodyPart::LeftAnkle, BodyPart::LeftKnee),
	(BodyPart::LeftKnee, BodyPart::LeftHip),
	(BodyPart::LeftHip, BodyPart::Core),
	(BodyPart::LeftShoulder, BodyPart::LeftElbow),
	(BodyPart::LeftElbow, BodyPart::LeftWrist),
	(BodyPart::LeftWrist, BodyPart::LeftHand),
	(BodyPart::LeftHand, BodyPart::LeftFingers),
	(BodyPart::LeftShoulder, BodyPart::Neck),
	(BodyPart::RightToe, BodyPart::RightHeel),
	(BodyPart::RightHeel, BodyPart::RightAnkle),
	(BodyPart::RightAnkle, BodyPart::RightKnee),
	(BodyPart::RightKnee, BodyPart::RightHip),
	(BodyPart::RightHip, BodyPart::Core),
	(BodyPart::RightShoulder, BodyPart::RightElbow),
	(BodyPart::RightElbow, BodyPart::RightWrist),
	(BodyPart::RightWrist, BodyPart::RightHand),
	(BodyPart::RightHand, BodyPart::RightFingers),
	(BodyPart::RightShoulder, BodyPart::Neck),
	(BodyPart::Core, BodyPart::Neck),
	(BodyPart::Neck, BodyPart::Head),
];

/// The pose view's camera: an orbit around the scene driven by the
/// rotation slider, or the first-person frame derived from a player's
/// pose.
#[derive(Clone, Copy, Debug)]
pub enum SceneCamera {
	Orbit { azimuth: f32 },
	FirstPerson(CameraFrame),
}

fn dot(a: V3, b: V3) -> f32 {
	a.x * b.x + a.y * b.y + a.z * b.z
}

fn cross(a: V3, b: V3) -> V3 {
	V3 {
		x: a.y * b.z - a.z * b.y,
		y: a.z * b.x - a.x * b.z,
		z: a.x * b.y - a.y * b.x,
	}
}

fn normalized(v: V3) -> V3 {
	let len = dot(v, v).sqrt();
	if len < 1e-6 { V3 { x: 0.0, y: 1.0, z: 0.0 } } else { v.scale(1.0 / len) }
}

struct Basis {
	eye: V3,
	right: V3,
	up: V3,
	forward: V3,
	scale: f32,
	cull_behind: bool,
}

impl Basis {
	fn orbit(pose: &Pose, azimuth: f32) -> Basis {
		let focus = centroid(pose);
		let ((sy, cy), (sp, cp)) = (azimuth.sin_cos(), ORBIT_PITCH.sin_cos());
		let eye = focus.add(V3 { x: cp * sy, y: sp, z: cp * cy }.scale(ORBIT_RADIUS));
		let forward = normalized(focus.subtract(eye));
		let right = normalized(cross(forward, V3 { x: 0.0, y: 1.0, z: 0.0 }));
		let up = cross(right, forward);
		Basis { eye, right, up, forward, scale: ORBIT_SCALE, cull_behind: false }
	}

	fn look(frame: &CameraFrame) -> Basis {
		let forward = normalized(frame.target.subtract(frame.position));
		let right = normalized(cross(forward, normalized(frame.up)));
		let up = cross(right, forward);
		Basis {
			eye: frame.position,
			right,
			up,
			forward,
			scale: FIRST_PERSON_SCALE,
			cull_behind: true,
		}
	}

	/// Orthographic projection into screen space, y up.
	fn project(&self, p: V3, cx: f64, cy: f64) -> Option<(f64, f64)> {
		let d = p.subtract(self.eye);
		if self.cull_behind && dot(d, self.forward) < 0.01 {
			return None;
		}
		let (x, y) = (dot(d, self.right) * self.scale, dot(d, self.up) * self.scale);
		Some((cx + x as f64, cy - y as f64))
	}
}

fn centroid(pose: &Pose) -> V3 {
	let mut sum = V3::default();
	for player in &pose.players {
		for part in BodyPart::ALL {
			sum = sum.add(player.get(part));
		}
	}
	sum.scale(1.0 / (2.0 * BodyPart::COUNT as f32))
}

/// Draw the displayed pose. Full repaint each frame.
pub fn render_scene(
	pose: &Pose,
	camera: &SceneCamera,
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, width, height);

	let basis = match camera {
		SceneCamera::Orbit { azimuth } => Basis::orbit(pose, *azimuth),
		SceneCamera::FirstPerson(frame) => Basis::look(frame),
	};
	let (cx, cy) = (width / 2.0, height / 2.0);

	for (player, color) in pose.players.iter().zip(PLAYER_COLORS) {
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(3.0);
		for &(a, b) in BONES {
			let (Some(pa), Some(pb)) = (
				basis.project(player.get(a), cx, cy),
				basis.project(player.get(b), cx, cy),
			) else {
				continue;
			};
			ctx.begin_path();
			ctx.move_to(pa.0, pa.1);
			ctx.line_to(pb.0, pb.1);
			ctx.stroke();
		}

		if let Some((hx, hy)) = basis.project(player.get(BodyPart::Head), cx, cy) {
			ctx.set_fill_style_str(color);
			ctx.begin_path();
			let _ = ctx.arc(hx, hy, 9.0, 0.0, 2.0 * PI);
			ctx.fill();
		}
	}
}
