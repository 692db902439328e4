//! Pan/zoom state and screen↔world transforms for the chart canvas.

use super::types::PositionedNode;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;
/// Multiplier applied per wheel tick when zooming in.
pub const ZOOM_IN_FACTOR: f64 = 1.1;
/// Multiplier applied per wheel tick when zooming out.
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Current view transform: world coordinates map to screen as
/// `screen = world * zoom + offset`. Mutated only by pointer handlers;
/// panning is unbounded, zoom is clamped to `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub offset_x: f64,
	pub offset_y: f64,
	pub zoom: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self { offset_x: 0.0, offset_y: 0.0, zoom: 1.0 }
	}
}

impl Viewport {
	/// Accumulate a drag delta in screen pixels.
	pub fn pan(&mut self, dx: f64, dy: f64) {
		self.offset_x += dx;
		self.offset_y += dy;
	}

	/// Multiply the zoom by `factor`, clamped. With a pivot (in screen
	/// coordinates) the world point under it stays put.
	pub fn zoom_by(&mut self, factor: f64, pivot: Option<(f64, f64)>) {
		let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		if let Some((px, py)) = pivot {
			let ratio = new_zoom / self.zoom;
			self.offset_x = px - (px - self.offset_x) * ratio;
			self.offset_y = py - (py - self.offset_y) * ratio;
		}
		self.zoom = new_zoom;
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.offset_x) / self.zoom,
			(sy - self.offset_y) / self.zoom,
		)
	}

	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(
			wx * self.zoom + self.offset_x,
			wy * self.zoom + self.offset_y,
		)
	}

	/// Resolve a screen coordinate to the first node whose box contains it.
	/// Level layout keeps boxes within a level disjoint, so no z-order is
	/// needed.
	pub fn hit_test<'a>(
		&self,
		nodes: &'a [PositionedNode],
		sx: f64,
		sy: f64,
	) -> Option<&'a PositionedNode> {
		let (wx, wy) = self.screen_to_world(sx, sy);
		nodes.iter().find(|n| n.contains(wx, wy))
	}
}
