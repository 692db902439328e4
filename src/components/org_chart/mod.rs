mod api;
mod component;
mod controller;
mod error;
mod layout;
mod render;
mod renderer;
mod types;
mod viewport;
mod worker;

pub use component::OrgChart;
pub use controller::{ChartConfig, ChartPhase, ChartState, OrgChartController};
pub use error::ChartError;
pub use layout::compute_layout;
pub use render::{LodThresholds, LodTier};
pub use types::{
	GraphNode, LayoutEdge, LayoutOptions, PositionedNode, SubtreeResponse, edges_from_parents,
};
pub use viewport::Viewport;
pub use worker::{LayoutRequest, LayoutResponse, LayoutWorker};
