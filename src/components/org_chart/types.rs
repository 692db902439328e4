use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Default node box width in world units, independent of LOD tier.
pub const NODE_WIDTH: f64 = 100.0;
/// Default node box height in world units.
pub const NODE_HEIGHT: f64 = 40.0;

/// A person in the org hierarchy as delivered by the subtree data API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	pub id: String,
	#[serde(default)]
	pub parent_id: Option<String>,
	pub first_name: String,
	pub last_name: String,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub avatar_url: Option<String>,
}

impl GraphNode {
	pub fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}

	/// First letter of first and last name, for the initials LOD tier.
	pub fn initials(&self) -> String {
		let mut out = String::new();
		out.extend(self.first_name.chars().next());
		out.extend(self.last_name.chars().next());
		out
	}
}

/// Directed manager→report edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
	pub from_id: String,
	pub to_id: String,
}

/// Spacing knobs for the layout engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
	pub vertical_spacing: f64,
	pub horizontal_spacing: f64,
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self {
			vertical_spacing: 120.0,
			horizontal_spacing: 140.0,
		}
	}
}

/// A node with its computed world-space box and hierarchy level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
	#[serde(flatten)]
	pub node: GraphNode,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
	pub level: u32,
}

impl PositionedNode {
	pub fn center(&self) -> (f64, f64) {
		(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn contains(&self, wx: f64, wy: f64) -> bool {
		wx >= self.x && wx <= self.x + self.width && wy >= self.y && wy <= self.y + self.height
	}
}

/// Body of `GET <endpoint>?max_depth=<n>`. The server caps the node count
/// (documented at 2000), so layout and render cost is bounded upstream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtreeResponse {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub edges: Vec<LayoutEdge>,
}

/// Derive explicit edges from the `parent_id` relation. A `parent_id` that
/// does not resolve within the node set yields no edge, leaving that node a
/// root.
pub fn edges_from_parents(nodes: &[GraphNode]) -> Vec<LayoutEdge> {
	let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
	nodes
		.iter()
		.filter_map(|node| {
			let parent = node.parent_id.as_deref()?;
			ids.contains(parent).then(|| LayoutEdge {
				from_id: parent.to_string(),
				to_id: node.id.clone(),
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn person(id: &str, parent: Option<&str>) -> GraphNode {
		GraphNode {
			id: id.into(),
			parent_id: parent.map(Into::into),
			first_name: "Ada".into(),
			last_name: "Lovelace".into(),
			title: None,
			avatar_url: None,
		}
	}

	#[test]
	fn initials_take_first_letters() {
		let node = person("1", None);
		assert_eq!(node.initials(), "AL");
		assert_eq!(node.full_name(), "Ada Lovelace");
	}

	#[test]
	fn edges_derived_from_parent_ids() {
		let nodes = vec![person("1", None), person("2", Some("1")), person("3", Some("1"))];
		let edges = edges_from_parents(&nodes);
		assert_eq!(
			edges,
			vec![
				LayoutEdge { from_id: "1".into(), to_id: "2".into() },
				LayoutEdge { from_id: "1".into(), to_id: "3".into() },
			]
		);
	}

	#[test]
	fn dangling_parent_id_is_treated_as_root() {
		let nodes = vec![person("1", None), person("2", Some("missing"))];
		assert!(edges_from_parents(&nodes).is_empty());
	}

	#[test]
	fn wire_format_uses_camel_case() {
		let json = serde_json::to_value(person("1", Some("0"))).unwrap();
		assert_eq!(json["parentId"], "0");
		assert_eq!(json["firstName"], "Ada");
		assert!(json.get("avatarUrl").is_some());
	}

	#[test]
	fn subtree_response_fields_default_to_empty() {
		let parsed: SubtreeResponse = serde_json::from_str("{}").unwrap();
		assert!(parsed.nodes.is_empty());
		assert!(parsed.edges.is_empty());
	}
}
