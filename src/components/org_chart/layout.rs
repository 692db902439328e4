//! BFS leveling layout for the manager/report forest.
//!
//! The engine is a pure function of its inputs: no state survives between
//! calls, so identical inputs always produce identical placements.

use std::collections::{HashMap, HashSet, VecDeque};

use super::types::{GraphNode, LayoutEdge, LayoutOptions, NODE_HEIGHT, NODE_WIDTH, PositionedNode};

/// Assign world-space positions to `nodes` using multi-root BFS leveling.
///
/// Roots are the nodes that never appear as an edge target (all nodes when
/// there are no edges). Each root sits at level 0 and every discovered child
/// at `level(parent) + 1`. Within a level, nodes are placed left to right in
/// BFS discovery order with uniform spacing.
///
/// Malformed input never errors: edge endpoints missing from `nodes` are
/// skipped, and a node is leveled at most once, so cyclic or multi-parent
/// input terminates with first-assignment-wins placement.
pub fn compute_layout(
	nodes: &[GraphNode],
	edges: &[LayoutEdge],
	options: LayoutOptions,
) -> Vec<PositionedNode> {
	let index_of: HashMap<&str, usize> = nodes
		.iter()
		.enumerate()
		.map(|(i, node)| (node.id.as_str(), i))
		.collect();

	let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
	let mut has_parent: HashSet<&str> = HashSet::new();
	for edge in edges {
		children
			.entry(edge.from_id.as_str())
			.or_default()
			.push(edge.to_id.as_str());
		has_parent.insert(edge.to_id.as_str());
	}

	fn discover<'a>(levels: &mut Vec<Vec<&'a str>>, id: &'a str, level: u32) {
		if levels.len() as u32 == level {
			levels.push(Vec::new());
		}
		levels[level as usize].push(id);
	}

	let mut level_of: HashMap<&str, u32> = HashMap::new();
	let mut levels: Vec<Vec<&str>> = Vec::new();
	let mut queue: VecDeque<&str> = VecDeque::new();

	for node in nodes {
		let id = node.id.as_str();
		if !has_parent.contains(id) {
			level_of.insert(id, 0);
			discover(&mut levels, id, 0);
			queue.push_back(id);
		}
	}

	while let Some(id) = queue.pop_front() {
		let next = level_of[id] + 1;
		let Some(kids) = children.get(id) else {
			continue;
		};
		for &kid in kids {
			// Ids that only occur in edges get no position.
			if !index_of.contains_key(kid) || level_of.contains_key(kid) {
				continue;
			}
			level_of.insert(kid, next);
			discover(&mut levels, kid, next);
			queue.push_back(kid);
		}
	}

	let mut positioned = Vec::with_capacity(level_of.len());
	for (level, ids) in levels.iter().enumerate() {
		for (slot, id) in ids.iter().enumerate() {
			positioned.push(PositionedNode {
				node: nodes[index_of[id]].clone(),
				x: slot as f64 * options.horizontal_spacing,
				y: level as f64 * options.vertical_spacing,
				width: NODE_WIDTH,
				height: NODE_HEIGHT,
				level: level as u32,
			});
		}
	}
	positioned
}

#[cfg(test)]
mod tests {
	use super::*;

	fn person(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			parent_id: None,
			first_name: format!("First{id}"),
			last_name: format!("Last{id}"),
			title: None,
			avatar_url: None,
		}
	}

	fn edge(from: &str, to: &str) -> LayoutEdge {
		LayoutEdge { from_id: from.into(), to_id: to.into() }
	}

	fn spacing(v: f64, h: f64) -> LayoutOptions {
		LayoutOptions { vertical_spacing: v, horizontal_spacing: h }
	}

	fn find<'a>(out: &'a [PositionedNode], id: &str) -> &'a PositionedNode {
		out.iter().find(|p| p.node.id == id).unwrap()
	}

	#[test]
	fn three_node_tree_matches_expected_slots() {
		let nodes = vec![person("1"), person("2"), person("3")];
		let edges = vec![edge("1", "2"), edge("1", "3")];
		let out = compute_layout(&nodes, &edges, spacing(120.0, 30.0));

		assert_eq!(out.len(), 3);
		let root = find(&out, "1");
		assert_eq!((root.level, root.x, root.y), (0, 0.0, 0.0));
		let second = find(&out, "2");
		assert_eq!((second.level, second.x, second.y), (1, 0.0, 120.0));
		let third = find(&out, "3");
		assert_eq!((third.level, third.x, third.y), (1, 30.0, 120.0));
	}

	#[test]
	fn child_level_is_parent_level_plus_one() {
		let nodes: Vec<GraphNode> = (0..12).map(|i| person(&i.to_string())).collect();
		// Forest of two trees with uneven fan-out.
		let edges = vec![
			edge("0", "2"),
			edge("0", "3"),
			edge("1", "4"),
			edge("3", "5"),
			edge("3", "6"),
			edge("4", "7"),
			edge("7", "8"),
			edge("2", "9"),
			edge("9", "10"),
			edge("10", "11"),
		];
		let out = compute_layout(&nodes, &edges, LayoutOptions::default());

		assert_eq!(out.len(), nodes.len());
		for e in &edges {
			let parent = find(&out, &e.from_id);
			let child = find(&out, &e.to_id);
			assert_eq!(child.level, parent.level + 1, "edge {}->{}", e.from_id, e.to_id);
			assert_eq!(child.y, parent.y + 120.0);
		}
	}

	#[test]
	fn no_edges_means_every_node_is_a_root() {
		let nodes = vec![person("a"), person("b"), person("c")];
		let out = compute_layout(&nodes, &[], spacing(100.0, 50.0));

		assert_eq!(out.len(), 3);
		for (i, p) in out.iter().enumerate() {
			assert_eq!(p.level, 0);
			assert_eq!(p.y, 0.0);
			assert_eq!(p.x, i as f64 * 50.0);
		}
		// Input order preserved within the level.
		let ids: Vec<&str> = out.iter().map(|p| p.node.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "b", "c"]);
	}

	#[test]
	fn edge_ids_outside_node_set_are_skipped() {
		let nodes = vec![person("1"), person("2")];
		let edges = vec![edge("1", "2"), edge("1", "ghost"), edge("phantom", "eidolon")];
		let out = compute_layout(&nodes, &edges, LayoutOptions::default());

		let ids: Vec<&str> = out.iter().map(|p| p.node.id.as_str()).collect();
		assert_eq!(ids, vec!["1", "2"]);
	}

	#[test]
	fn every_reachable_node_gets_exactly_one_position() {
		let nodes = vec![person("r"), person("x"), person("y"), person("lone")];
		let edges = vec![edge("r", "x"), edge("x", "y")];
		let out = compute_layout(&nodes, &edges, LayoutOptions::default());

		assert_eq!(out.len(), 4);
		let mut ids: Vec<&str> = out.iter().map(|p| p.node.id.as_str()).collect();
		ids.sort();
		ids.dedup();
		assert_eq!(ids.len(), 4);
		// Disconnected node sits at level 0 alongside the root.
		assert_eq!(find(&out, "lone").level, 0);
	}

	#[test]
	fn identical_inputs_produce_identical_output() {
		let nodes = vec![person("1"), person("2"), person("3"), person("4")];
		let edges = vec![edge("1", "2"), edge("2", "3"), edge("1", "4")];
		let options = spacing(80.0, 60.0);

		let first = compute_layout(&nodes, &edges, options);
		let second = compute_layout(&nodes, &edges, options);
		assert_eq!(first, second);
	}

	#[test]
	fn cyclic_input_terminates() {
		let nodes = vec![person("1"), person("2"), person("3")];
		// 2 and 3 form a cycle below the root.
		let edges = vec![edge("1", "2"), edge("2", "3"), edge("3", "2")];
		let out = compute_layout(&nodes, &edges, LayoutOptions::default());

		assert_eq!(out.len(), 3);
		assert_eq!(find(&out, "2").level, 1);
		assert_eq!(find(&out, "3").level, 2);
	}
}
