//! Canvas rendering for the debrief graphs.
//!
//! The renderer is a pure adapter over the view state: it reads positions
//! from the simulation and the visibility set from playback and the fact
//! cap, and never mutates either. Drawing runs in passes for z-ordering:
//! 1. Background (screen space)
//! 2. Edges with arrowheads (world space)
//! 3. Node circles, icons, and labels (world space)
//! 4. Legend box and the fact-count table (screen space)

use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::icons;
use super::state::{GraphView, NODE_RADIUS};
use super::status::{NO_STATUS_FILL, status_color};
use super::types::{GraphKind, NodeKind};

const BACKGROUND: &str = "#2b2b2b";
const EDGE_COLOR: &str = "#aaaaaa";
const NODE_BORDER: &str = "#424242";
const ARROW_SIZE: f64 = 8.0;
const LEGEND_WIDTH: f64 = 183.0;
const LEGEND_LINE_HEIGHT: f64 = 30.0;

/// Decoded icon images keyed by asset path. Browsers load the images
/// asynchronously; icons simply pop in on the first frame after their
/// image has decoded.
pub struct IconCache {
	images: HashMap<&'static str, HtmlImageElement>,
}

impl IconCache {
	/// Start loading every known icon.
	pub fn new() -> Self {
		let mut images = HashMap::new();
		for (_, path) in icons::ICONS {
			if let Ok(image) = HtmlImageElement::new() {
				image.set_src(path);
				images.insert(*path, image);
			}
		}
		Self { images }
	}

	fn get(&self, path: &str) -> Option<&HtmlImageElement> {
		self.images.get(path).filter(|image| image.complete())
	}
}

impl Default for IconCache {
	fn default() -> Self {
		Self::new()
	}
}

/// Render the complete view to the canvas.
pub fn render(view: &GraphView, ctx: &CanvasRenderingContext2d, icons: &IconCache) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, view.width, view.height);

	ctx.save();
	let _ = ctx.translate(view.transform.x, view.transform.y);
	let _ = ctx.scale(view.transform.k, view.transform.k);

	draw_edges(view, ctx);
	draw_nodes(view, ctx, icons);

	ctx.restore();

	draw_legend(view, ctx, icons);
}

fn draw_edges(view: &GraphView, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_fill_style_str(EDGE_COLOR);
	ctx.set_line_width(1.5);

	for (index, edge) in view.edges.iter().enumerate() {
		if !view.edge_visible(index) {
			continue;
		}
		let s = &view.sim.nodes()[edge.source];
		let t = &view.sim.nodes()[edge.target];
		let (dx, dy) = (t.x - s.x, t.y - s.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);

		ctx.begin_path();
		ctx.move_to(s.x + ux * NODE_RADIUS, s.y + uy * NODE_RADIUS);
		ctx.line_to(
			t.x - ux * (NODE_RADIUS + ARROW_SIZE),
			t.y - uy * (NODE_RADIUS + ARROW_SIZE),
		);
		ctx.stroke();

		// Arrowhead sitting just outside the target circle.
		let (tip_x, tip_y) = (t.x - ux * NODE_RADIUS, t.y - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * ARROW_SIZE, tip_y - uy * ARROW_SIZE);
		let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);

		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(view: &GraphView, ctx: &CanvasRenderingContext2d, icons: &IconCache) {
	for (index, node) in view.nodes.iter().enumerate() {
		if !view.node_visible(index) {
			continue;
		}
		let sim_node = &view.sim.nodes()[index];
		let (x, y) = (sim_node.x, sim_node.y);

		let fill = match node.status {
			Some(status) => status_color(status),
			None => NO_STATUS_FILL,
		};
		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(fill);
		ctx.fill();
		ctx.set_stroke_style_str(NODE_BORDER);
		ctx.set_line_width(1.0);
		ctx.stroke();

		if let Some(image) = icons.get(icons::icon_path_for(node)) {
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
				image,
				x - 16.0,
				y - 8.0,
				32.0,
				16.0,
			);
		}

		// Step nodes carry their identity in the icon swap, not a label.
		if node.kind != NodeKind::Link {
			ctx.set_fill_style_str("white");
			ctx.set_font("12px sans-serif");
			let _ = ctx.fill_text(&node.name, x + 18.0, y + 8.0);
		}
	}
}

fn capitalize(label: &str) -> String {
	let mut chars = label.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
		None => String::new(),
	}
}

fn draw_legend(view: &GraphView, ctx: &CanvasRenderingContext2d, icons: &IconCache) {
	let left = view.width - 193.0;
	let box_height = 50.0 + LEGEND_LINE_HEIGHT * view.legend.len() as f64;

	ctx.set_fill_style_str("rgba(170, 170, 170, 0.5)");
	ctx.fill_rect(left, 10.0, LEGEND_WIDTH, box_height);

	ctx.set_fill_style_str("white");
	ctx.set_font("bold 13px sans-serif");
	let _ = ctx.fill_text("Legend", view.width - 130.0, 35.0);

	ctx.set_font("13px sans-serif");
	for (i, entry) in view.legend.iter().enumerate() {
		let y = 60.0 + (i as f64) * LEGEND_LINE_HEIGHT;
		if let Some(image) = icons.get(entry.icon) {
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
				image,
				view.width - 180.0,
				y,
				20.0,
				20.0,
			);
		}
		ctx.set_fill_style_str("white");
		let _ = ctx.fill_text(&capitalize(&entry.key), view.width - 135.0, y + 15.0);
	}

	if view.kind == GraphKind::Fact && !view.fact_counts.is_empty() {
		let table_top = 10.0 + box_height + 20.0;
		for (i, row) in view.fact_counts.iter().enumerate() {
			let y = table_top + (i as f64) * 20.0;
			let _ = ctx.fill_text(&row.count.to_string(), view.width - 190.0, y);
			let _ = ctx.fill_text(&row.name, view.width - 160.0, y);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn capitalize_handles_empty_and_single_words() {
		assert_eq!(capitalize(""), "");
		assert_eq!(capitalize("windows"), "Windows");
		assert_eq!(capitalize("technique_name"), "Technique_name");
	}
}
