//! Canvas drawing for the org chart, one LOD tier per frame.

use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::types::{LayoutEdge, PositionedNode};
use super::viewport::Viewport;

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const BACKGROUND: &str = "#1a1a2e";
const EDGE_STROKE: &str = "rgba(100, 180, 255, 0.25)";

const DOT_RADIUS: f64 = 5.0;
const INITIALS_BOX: f64 = 20.0;
const AVATAR_32: f64 = 32.0;
const AVATAR_64: f64 = 64.0;

/// Zoom thresholds separating the four LOD tiers. Callers must keep
/// `dot < avatar32 < avatar64`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodThresholds {
	pub dot: f64,
	pub avatar32: f64,
	pub avatar64: f64,
}

impl Default for LodThresholds {
	fn default() -> Self {
		Self { dot: 0.35, avatar32: 0.75, avatar64: 1.5 }
	}
}

/// Visual representation chosen per frame from the current zoom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodTier {
	/// Extreme zoom-out: one filled dot per node.
	Dot,
	/// Initials in a colored square.
	Initials,
	/// 32px-class avatar placeholder plus full name.
	Avatar32,
	/// 64px-class avatar placeholder plus name and title.
	Avatar64,
}

impl LodTier {
	pub fn for_zoom(zoom: f64, thresholds: &LodThresholds) -> Self {
		if zoom < thresholds.dot {
			LodTier::Dot
		} else if zoom < thresholds.avatar32 {
			LodTier::Initials
		} else if zoom < thresholds.avatar64 {
			LodTier::Avatar32
		} else {
			LodTier::Avatar64
		}
	}
}

/// Stable palette pick so a node keeps its color across frames and layouts.
pub fn color_for_id(id: &str) -> &'static str {
	let mut hash: u32 = 2166136261;
	for byte in id.bytes() {
		hash ^= byte as u32;
		hash = hash.wrapping_mul(16777619);
	}
	COLORS[hash as usize % COLORS.len()]
}

/// Clear the surface and redraw every edge and node under the current view
/// transform. Full clear-and-redraw per frame; node counts are capped by the
/// data API.
pub fn render(
	ctx: &CanvasRenderingContext2d,
	nodes: &[PositionedNode],
	edges: &[LayoutEdge],
	viewport: &Viewport,
	thresholds: &LodThresholds,
	width: f64,
	height: f64,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(viewport.offset_x, viewport.offset_y);
	let _ = ctx.scale(viewport.zoom, viewport.zoom);
	draw_edges(ctx, nodes, edges, viewport.zoom);
	draw_nodes(ctx, nodes, LodTier::for_zoom(viewport.zoom, thresholds));
	ctx.restore();
}

/// Edges are drawn at every tier: a straight line from the parent box's
/// bottom-center to the child box's top-center.
fn draw_edges(
	ctx: &CanvasRenderingContext2d,
	nodes: &[PositionedNode],
	edges: &[LayoutEdge],
	zoom: f64,
) {
	let by_id: HashMap<&str, &PositionedNode> =
		nodes.iter().map(|n| (n.node.id.as_str(), n)).collect();

	ctx.set_stroke_style_str(EDGE_STROKE);
	ctx.set_line_width(1.5 / zoom);
	ctx.begin_path();
	for edge in edges {
		let (Some(parent), Some(child)) =
			(by_id.get(edge.from_id.as_str()), by_id.get(edge.to_id.as_str()))
		else {
			continue;
		};
		ctx.move_to(parent.x + parent.width / 2.0, parent.y + parent.height);
		ctx.line_to(child.x + child.width / 2.0, child.y);
	}
	ctx.stroke();
}

fn draw_nodes(ctx: &CanvasRenderingContext2d, nodes: &[PositionedNode], tier: LodTier) {
	for positioned in nodes {
		let (cx, cy) = positioned.center();
		let color = color_for_id(&positioned.node.id);

		match tier {
			LodTier::Dot => {
				ctx.begin_path();
				let _ = ctx.arc(cx, cy, DOT_RADIUS, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(color);
				ctx.fill();
			}
			LodTier::Initials => {
				ctx.set_fill_style_str(color);
				ctx.fill_rect(
					cx - INITIALS_BOX / 2.0,
					cy - INITIALS_BOX / 2.0,
					INITIALS_BOX,
					INITIALS_BOX,
				);
				ctx.set_fill_style_str("white");
				ctx.set_font("10px sans-serif");
				ctx.set_text_align("center");
				let _ = ctx.fill_text(&positioned.node.initials(), cx, cy + 3.5);
			}
			LodTier::Avatar32 => {
				draw_avatar(ctx, cx, cy, AVATAR_32 / 2.0, positioned, color);
				ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
				ctx.set_font("12px sans-serif");
				ctx.set_text_align("center");
				let _ = ctx.fill_text(
					&positioned.node.full_name(),
					cx,
					positioned.y + positioned.height + 12.0,
				);
			}
			LodTier::Avatar64 => {
				draw_avatar(ctx, cx, cy, AVATAR_64 / 2.0, positioned, color);
				ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
				ctx.set_font("12px sans-serif");
				ctx.set_text_align("center");
				let label_y = cy + AVATAR_64 / 2.0 + 14.0;
				let _ = ctx.fill_text(&positioned.node.full_name(), cx, label_y);
				if let Some(title) = &positioned.node.title {
					ctx.set_fill_style_str("rgba(200, 200, 210, 0.8)");
					ctx.set_font("10px sans-serif");
					let _ = ctx.fill_text(title, cx, label_y + 13.0);
				}
			}
		}
	}
	ctx.set_text_align("start");
}

/// Avatar placeholder: colored disc with the initials inside. Actual image
/// decoding stays outside this subsystem.
fn draw_avatar(
	ctx: &CanvasRenderingContext2d,
	cx: f64,
	cy: f64,
	radius: f64,
	positioned: &PositionedNode,
	color: &str,
) {
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(color);
	ctx.fill();
	ctx.set_fill_style_str("white");
	ctx.set_font(&format!("{}px sans-serif", (radius * 0.6).round()));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(&positioned.node.initials(), cx, cy + radius * 0.2);
}
