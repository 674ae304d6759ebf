use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::animator::PoseBlender;
use super::camera::{self, ViewMode};
use super::layout::ForceLayout;
use super::persistence::BrowserLocation;
use super::ready::StatusGate;
use super::render::{self, DiagramFrame, ViewTransform};
use super::scene::{self, SceneCamera};
use super::session::ExplorerSession;
use super::types::{Catalog, CatalogError, NodeId};

/// Pointer travel below this many pixels still counts as a click.
const CLICK_SLOP: f64 = 4.0;

type Session = ExplorerSession<ForceLayout, PoseBlender, BrowserLocation>;

#[derive(Clone, Debug, Default)]
struct DragState {
	node: Option<NodeId>,
	start_x: f64,
	start_y: f64,
	moved: bool,
}

#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

struct ExplorerApp {
	session: Session,
	transform: ViewTransform,
	drag: DragState,
	pan: PanState,
	azimuth: f32,
	diagram_size: (f64, f64),
	scene_size: (f64, f64),
}

impl ExplorerApp {
	fn new(catalog_json: &str, diagram_size: (f64, f64), scene_size: (f64, f64)) -> Result<Self, CatalogError> {
		let catalog = Catalog::from_json(catalog_json)?;
		let node_count = catalog.nodes.len();
		let session = ExplorerSession::boot(
			catalog.clone(),
			ForceLayout::new(),
			BrowserLocation,
			move || random_node(node_count),
			|initial| PoseBlender::new(catalog, initial),
		);
		Ok(Self {
			session,
			transform: ViewTransform::centered(diagram_size.0, diagram_size.1),
			drag: DragState::default(),
			pan: PanState::default(),
			azimuth: 0.0,
			diagram_size,
			scene_size,
		})
	}

	fn node_at(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		self.session.engine().node_at(gx, gy)
	}

	fn paint(&mut self, diagram: &CanvasRenderingContext2d, pose_view: &CanvasRenderingContext2d) {
		self.session.frame(0.016);

		let positions = self.session.engine().positions();
		render::render(
			&DiagramFrame {
				subgraph: self.session.visible(),
				catalog: self.session.catalog(),
				positions: &positions,
				selected: self.session.selection().ids(),
				focused: self.session.selection().focused(),
				transform: &self.transform,
				width: self.diagram_size.0,
				height: self.diagram_size.1,
			},
			diagram,
		);

		let camera = match self.session.camera_frame() {
			Some(frame) => SceneCamera::FirstPerson(frame),
			None => SceneCamera::Orbit { azimuth: self.azimuth },
		};
		scene::render_scene(
			self.session.pose(),
			&camera,
			pose_view,
			self.scene_size.0,
			self.scene_size.1,
		);
	}
}

fn random_node(count: usize) -> NodeId {
	((js_sys::Math::random() * count as f64) as usize).min(count.saturating_sub(1))
}

fn canvas_context(canvas: &HtmlCanvasElement) -> CanvasRenderingContext2d {
	canvas
		.get_context("2d")
		.unwrap()
		.unwrap()
		.dyn_into()
		.unwrap()
}

fn event_pos(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// The explorer: a 2D diagram of the selected subgraph next to a 3D
/// view of the hovered position, plus the control strip.
#[component]
pub fn ExplorerView(catalog_json: &'static str) -> impl IntoView {
	let diagram_ref = NodeRef::<leptos::html::Canvas>::new();
	let scene_ref = NodeRef::<leptos::html::Canvas>::new();
	let app: Rc<RefCell<Option<ExplorerApp>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let edit_mode = RwSignal::new(false);
	let search_href = RwSignal::new(String::new());
	let composer_href = RwSignal::new(String::new());

	let sync_ui = move |app: &ExplorerApp| {
		edit_mode.set(app.session.edit_mode());
		search_href.set(app.session.links().search.clone());
		composer_href.set(app.session.links().composer.clone());
	};

	let (app_init, animate_init) = (app.clone(), animate.clone());
	Effect::new(move |_| {
		let (Some(diagram), Some(pose_view)) = (diagram_ref.get(), scene_ref.get()) else {
			return;
		};
		let diagram: HtmlCanvasElement = diagram.into();
		let pose_view: HtmlCanvasElement = pose_view.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = (
			window.inner_width().unwrap().as_f64().unwrap(),
			window.inner_height().unwrap().as_f64().unwrap(),
		);
		let (dw, dh) = (w * 0.55, h);
		let (sw, sh) = (w - dw, h);
		diagram.set_width(dw as u32);
		diagram.set_height(dh as u32);
		pose_view.set_width(sw as u32);
		pose_view.set_height(sh as u32);

		let diagram_ctx = canvas_context(&diagram);
		let scene_ctx = canvas_context(&pose_view);

		// Asset loading completion arrives as repeated status callbacks;
		// the empty status is the signal to build the scene and restore
		// the selection.
		let mut gate = StatusGate::new();
		let app_boot = app_init.clone();
		let mut on_status = move |text: &str| {
			log::debug!("status: {text}");
			if !gate.on_status(text) {
				return;
			}
			match ExplorerApp::new(catalog_json, (dw, dh), (sw, sh)) {
				Ok(built) => {
					sync_ui(&built);
					*app_boot.borrow_mut() = Some(built);
				}
				Err(e) => error!("catalog unavailable: {e}"),
			}
		};
		on_status("loading catalog");
		on_status("");

		let (app_anim, animate_inner) = (app_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut a) = *app_anim.borrow_mut() {
				a.paint(&diagram_ctx, &scene_ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let app_md = app.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = diagram_ref.get().unwrap().into();
		let (x, y) = event_pos(&canvas, &ev);

		if let Some(ref mut a) = *app_md.borrow_mut() {
			if let Some(id) = a.node_at(x, y) {
				a.drag = DragState { node: Some(id), start_x: x, start_y: y, moved: false };
			} else {
				a.pan = PanState {
					active: true,
					start_x: x,
					start_y: y,
					transform_start_x: a.transform.x,
					transform_start_y: a.transform.y,
				};
			}
		}
	};

	let app_mm = app.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = diagram_ref.get().unwrap().into();
		let (x, y) = event_pos(&canvas, &ev);

		if let Some(ref mut a) = *app_mm.borrow_mut() {
			if let Some(id) = a.drag.node {
				if (x - a.drag.start_x).abs() + (y - a.drag.start_y).abs() > CLICK_SLOP {
					a.drag.moved = true;
				}
				if a.drag.moved {
					let (gx, gy) = a.transform.screen_to_graph(x, y);
					a.session.engine_mut().drag_to(id, gx as f32, gy as f32);
				}
			} else if a.pan.active {
				a.transform.x = a.pan.transform_start_x + (x - a.pan.start_x);
				a.transform.y = a.pan.transform_start_y + (y - a.pan.start_y);
			} else if let Some(id) = a.node_at(x, y) {
				if a.session.hover(id) {
					sync_ui(a);
				}
			}
		}
	};

	let app_mu = app.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut a) = *app_mu.borrow_mut() {
			// A press that never travelled is a click, not a drag.
			if let (Some(id), false) = (a.drag.node, a.drag.moved) {
				if a.session.node_clicked(id) {
					sync_ui(a);
				}
			}
			a.drag = DragState::default();
			a.pan = PanState::default();
		}
	};

	let app_ml = app.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut a) = *app_ml.borrow_mut() {
			a.drag = DragState::default();
			a.pan = PanState::default();
		}
	};

	let app_wh = app.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = diagram_ref.get().unwrap().into();
		let (x, y) = event_pos(&canvas, &ev);

		if let Some(ref mut a) = *app_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (a.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / a.transform.k;
			a.transform.x = x - (x - a.transform.x) * ratio;
			a.transform.y = y - (y - a.transform.y) * ratio;
			a.transform.k = new_k;
		}
	};

	let app_edit = app.clone();
	let on_edit = move |ev: Event| {
		let on = event_target_checked(&ev);
		if let Some(ref mut a) = *app_edit.borrow_mut() {
			a.session.set_edit_mode(on);
			sync_ui(a);
		}
	};

	let app_mirror = app.clone();
	let on_mirror = move |_| {
		if let Some(ref mut a) = *app_mirror.borrow_mut() {
			a.session.toggle_mirror();
		}
	};

	let app_rotate = app.clone();
	let on_rotate = move |ev: Event| {
		let v = event_target_value(&ev).parse::<i32>().unwrap_or(0);
		if let Some(ref mut a) = *app_rotate.borrow_mut() {
			a.azimuth = camera::azimuth_for(v);
		}
	};

	let app_view = app.clone();
	let on_view_change = move |ev: Event| {
		let mode = ViewMode::parse(&event_target_value(&ev));
		if let Some(ref mut a) = *app_view.borrow_mut() {
			a.session.set_view(mode);
		}
	};

	view! {
		<div class="explorer" style="display: flex;">
			<canvas
				node_ref=diagram_ref
				class="diagram-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<canvas node_ref=scene_ref class="pose-canvas" style="display: block;" />
			<div class="explorer-controls">
				<label>
					<input type="checkbox" prop:checked=edit_mode on:change=on_edit />
					"edit mode"
				</label>
				<p style:display=move || if edit_mode.get() { "block" } else { "none" }>
					"click a node to select or deselect it"
				</p>
				<button on:click=on_mirror>"mirror"</button>
				<label>
					"rotate"
					<input type="range" min="0" max="39" value="0" on:input=on_rotate />
				</label>
				<select on:change=on_view_change>
					<option value="external">"external view"</option>
					<option value="0">"red's view"</option>
					<option value="1">"blue's view"</option>
				</select>
				<a href=move || search_href.get()>"search this position"</a>
				<a href=move || composer_href.get()>"open in composer"</a>
			</div>
		</div>
	}
}
