//! Leptos component wrapping one debrief graph canvas.
//!
//! The component creates an HTML canvas, wires up mouse event handlers for
//! node dragging, panning, zooming, and tooltips, and owns the playback
//! control bar. An animation loop runs via `requestAnimationFrame`,
//! advancing the physics simulation and redrawing each frame. Every change
//! of the `data` signal rebuilds the whole session, which also cancels any
//! running playback timer.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::playback::STEP_INTERVAL_MS;
use super::render::{self, IconCache};
use super::state::GraphView;
use super::tooltip::tooltip_lines;
use super::types::{GraphData, GraphKind};

const OP_GRAPH_HEIGHT: f64 = 400.0;
const FACT_GRAPH_HEIGHT: f64 = 600.0;

/// Bundles the view session with its rendering and playback resources.
struct GraphContext {
	view: GraphView,
	icons: IconCache,
	// At most one reveal timer per view; dropping the handle cancels it.
	timer: Option<Interval>,
}

/// Renders one interactive debrief graph on a canvas element, with a
/// playback control bar underneath. Pass the graph payload via the
/// reactive `data` signal; each new payload rebuilds the view from
/// scratch (positions, playback cursor, and pins do not survive).
#[component]
pub fn DebriefGraphCanvas(
	/// Graph payload for this view.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Which of the five views this canvas shows.
	kind: GraphKind,
	/// Receives the fact-cap readability warning after each rebuild.
	#[prop(optional)]
	fact_warning: Option<WriteSignal<Option<String>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let tooltip = RwSignal::new(None::<(f64, f64, Vec<String>)>);
	let playing = RwSignal::new(false);

	let (context_init, animate_init) = (context.clone(), animate.clone());
	Effect::new(move |_| {
		let data = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		let width = canvas
			.parent_element()
			.map(|p| p.client_width() as f64)
			.filter(|w| *w > 0.0)
			.unwrap_or(800.0);
		let height = if kind == GraphKind::Fact {
			FACT_GRAPH_HEIGHT
		} else {
			OP_GRAPH_HEIGHT
		};
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let view = GraphView::new(kind, &data, width, height);
		if let Some(warning) = fact_warning {
			warning.set(view.fact_warning.clone());
		}
		playing.set(false);
		// Replacing the context drops any previous playback timer, so a
		// superseded selection can never keep revealing nodes.
		*context_init.borrow_mut() = Some(GraphContext {
			view,
			icons: IconCache::new(),
			timer: None,
		});

		if animate_init.borrow().is_some() {
			return;
		}
		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.view.tick();
				// The controller pauses itself when the reveal order is
				// exhausted; retire the timer here, outside its callback.
				if c.view.playback.paused() {
					c.timer = None;
					if playing.get_untracked() {
						playing.set(false);
					}
				}
				render::render(&c.view, &ctx, &c.icons);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = web_sys::window()
				.unwrap()
				.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let pointer_position = move |ev: &MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut c) = *context_md.borrow_mut() {
			if let Some(index) = c.view.node_at_position(x, y) {
				let (wx, wy) = c.view.screen_to_graph(x, y);
				c.view.begin_drag(index, wx, wy);
				tooltip.set(None);
			} else {
				c.view.pan.active = true;
				c.view.pan.start_x = x;
				c.view.pan.start_y = y;
				c.view.pan.transform_start_x = c.view.transform.x;
				c.view.pan.transform_start_y = c.view.transform.y;
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.view.drag.active {
				let (wx, wy) = c.view.screen_to_graph(x, y);
				c.view.drag_to(wx, wy);
			} else if c.view.pan.active {
				c.view.transform.x = c.view.pan.transform_start_x + (x - c.view.pan.start_x);
				c.view.transform.y = c.view.pan.transform_start_y + (y - c.view.pan.start_y);
			} else {
				let hovered = c.view.node_at_position(x, y);
				c.view.hovered = hovered;
				tooltip.set(hovered.map(|index| {
					(x + 10.0, y + 10.0, tooltip_lines(&c.view.nodes[index]))
				}));
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			if c.view.drag.active {
				// Pin-in-place: the node keeps its drop position until the
				// next rebuild.
				c.view.end_drag();
			}
			c.view.pan.active = false;
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			if c.view.drag.active {
				c.view.end_drag();
			}
			c.view.pan.active = false;
			c.view.hovered = None;
		}
		tooltip.set(None);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (c.view.transform.k * factor).clamp(0.5, 5.0);
			let ratio = new_k / c.view.transform.k;
			c.view.transform.x = x - (x - c.view.transform.x) * ratio;
			c.view.transform.y = y - (y - c.view.transform.y) * ratio;
			c.view.transform.k = new_k;
		}
	};

	let context_rw = context.clone();
	let on_rewind = move |_| {
		if let Some(ref mut c) = *context_rw.borrow_mut() {
			c.view.playback.seek_start();
			c.view.playback.set_paused(true);
			c.timer = None;
		}
		playing.set(false);
	};

	let context_bk = context.clone();
	let on_step_back = move |_| {
		if let Some(ref mut c) = *context_bk.borrow_mut() {
			c.view.playback.step_back();
		}
	};

	let context_tg = context.clone();
	let on_toggle_play = move |_| {
		if let Some(ref mut c) = *context_tg.borrow_mut() {
			if c.view.playback.paused() {
				c.view.playback.set_paused(false);
				let ticker = context_tg.clone();
				c.timer = Some(Interval::new(STEP_INTERVAL_MS, move || {
					if let Some(ref mut c) = *ticker.borrow_mut() {
						c.view.playback.step_forward();
					}
				}));
				playing.set(true);
			} else {
				c.view.playback.set_paused(true);
				c.timer = None;
				playing.set(false);
			}
		}
	};

	let context_fw = context.clone();
	let on_step_forward = move |_| {
		if let Some(ref mut c) = *context_fw.borrow_mut() {
			c.view.playback.step_forward();
		}
	};

	let context_ed = context.clone();
	let on_seek_end = move |_| {
		if let Some(ref mut c) = *context_ed.borrow_mut() {
			c.view.playback.seek_end();
			c.view.playback.set_paused(true);
			c.timer = None;
		}
		playing.set(false);
	};

	view! {
		<div class="debrief-graph" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="debrief-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			{move || {
				tooltip.get().map(|(x, y, lines)| {
					view! {
						<div
							class="graph-tooltip"
							style=format!(
								"position: absolute; left: {x}px; top: {y}px; \
								 background: rgba(0, 0, 0, 0.8); color: white; \
								 padding: 4px 8px; font-size: 12px; pointer-events: none;",
							)
						>
							{lines
								.into_iter()
								.map(|line| view! { <div>{line}</div> })
								.collect_view()}
						</div>
					}
				})
			}}
			<div class="playback-controls">
				<button on:click=on_rewind title="Back to start">"|<"</button>
				<button on:click=on_step_back title="Step back">"<"</button>
				<button on:click=on_toggle_play title="Play / pause">
					{move || if playing.get() { "pause" } else { "play" }}
				</button>
				<button on:click=on_step_forward title="Step forward">">"</button>
				<button on:click=on_seek_end title="Show all">">|"</button>
			</div>
		</div>
	}
}
