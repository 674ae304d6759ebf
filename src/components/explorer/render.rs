use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::layout::NODE_RADIUS;
use super::subgraph::VisibleSubgraph;
use super::types::{Catalog, NodeId};

/// Pan/zoom of the diagram canvas.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	pub fn centered(width: f64, height: f64) -> Self {
		Self { x: width / 2.0, y: height / 2.0, k: 1.0 }
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

/// Everything one diagram paint needs. Rebuilt per frame; positions
/// come straight out of the layout engine.
pub struct DiagramFrame<'a> {
	pub subgraph: &'a VisibleSubgraph,
	pub catalog: &'a Catalog,
	pub positions: &'a HashMap<NodeId, (f32, f32)>,
	pub selected: &'a [NodeId],
	pub focused: Option<NodeId>,
	pub transform: &'a ViewTransform,
	pub width: f64,
	pub height: f64,
}

pub fn render(frame: &DiagramFrame, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#fdfdf8");
	ctx.fill_rect(0.0, 0.0, frame.width, frame.height);
	ctx.save();
	let _ = ctx.translate(frame.transform.x, frame.transform.y);
	let _ = ctx.scale(frame.transform.k, frame.transform.k);
	draw_edges(frame, ctx);
	draw_nodes(frame, ctx);
	ctx.restore();
}

fn draw_edges(frame: &DiagramFrame, ctx: &CanvasRenderingContext2d) {
	let k = frame.transform.k;
	let (line_width, arrow_size) = (1.5 / k, 8.0 / k);

	for edge in &frame.subgraph.edges {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(frame.positions.get(&edge.from), frame.positions.get(&edge.to))
		else {
			continue;
		};
		let (x1, y1, x2, y2) = (x1 as f64, y1 as f64, x2 as f64, y2 as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let color = edge.color.as_css();

		ctx.set_stroke_style_str(color);
		ctx.set_line_width(line_width);
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(
			x2 - ux * (NODE_RADIUS + arrow_size),
			y2 - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		// Arrowhead at the destination marker's rim.
		ctx.set_fill_style_str(color);
		let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(frame: &DiagramFrame, ctx: &CanvasRenderingContext2d) {
	let k = frame.transform.k;

	for &id in &frame.subgraph.nodes {
		let Some(&(x, y)) = frame.positions.get(&id) else {
			continue;
		};
		let (x, y) = (x as f64, y as f64);
		let selected = frame.selected.contains(&id);

		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		// Selected nodes filled; edit-mode neighbors hollow.
		ctx.set_fill_style_str(if selected { "#4a7ab5" } else { "#ffffff" });
		ctx.fill();
		ctx.set_stroke_style_str("#333333");
		ctx.set_line_width(1.0 / k);
		ctx.stroke();

		if frame.focused == Some(id) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, NODE_RADIUS + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("#d62728");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		if let Some(line) = &frame.catalog.node(id).line {
			ctx.set_fill_style_str("#222222");
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(line, x + NODE_RADIUS + 3.0, y + 3.0);
		}
	}
}
