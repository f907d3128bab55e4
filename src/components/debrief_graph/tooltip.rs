//! Tooltip text for hovered nodes.

use super::status::status_name;
use super::types::{GraphNode, NodeKind};

fn value_text(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Tooltip lines for a node, shaped per category the way the report
/// renders them: operations lead with identity, tactic/technique nodes
/// lead with their classification, everything else lists its attributes.
pub fn tooltip_lines(node: &GraphNode) -> Vec<String> {
	let mut lines = Vec::new();
	match node.kind {
		NodeKind::Operation => {
			lines.push(format!("name: {}", node.name));
			lines.push(format!("op_id: {}", node.id));
			if let Some(ts) = &node.timestamp {
				lines.push(format!("created: {ts}"));
			}
		}
		NodeKind::Tactic | NodeKind::TechniqueName => {
			let token = node.kind.token();
			if let Some(value) = node.attrs.get(token) {
				lines.push(format!("{token}: {}", value_text(value)));
			}
			if let Some(ts) = &node.timestamp {
				lines.push(format!("created: {ts}"));
			}
			for (key, value) in &node.attrs {
				if key != token {
					lines.push(format!("{key}: {}", value_text(value)));
				}
			}
		}
		_ => {
			if let Some(ts) = &node.timestamp {
				lines.push(format!("created: {ts}"));
			}
			for (key, value) in &node.attrs {
				if value.is_null() {
					continue;
				}
				if key == "status" {
					let status = value.as_i64().unwrap_or(i64::from(i32::MAX)) as i32;
					lines.push(format!("status: {}", status_name(status)));
				} else {
					lines.push(format!("{key}: {}", value_text(value)));
				}
			}
		}
	}
	lines
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::debrief_graph::types::NodeId;

	#[test]
	fn operation_tooltip_leads_with_identity() {
		let node = GraphNode {
			id: NodeId::Text("op-1".into()),
			name: "discovery run".into(),
			kind: NodeKind::Operation,
			img: "operation".into(),
			status: None,
			timestamp: Some("2024-03-01 10:00:00".into()),
			operation: None,
			attrs: Default::default(),
		};
		assert_eq!(
			tooltip_lines(&node),
			vec![
				"name: discovery run",
				"op_id: op-1",
				"created: 2024-03-01 10:00:00"
			]
		);
	}

	#[test]
	fn step_tooltip_maps_status_through_taxonomy_and_skips_nulls() {
		let node: GraphNode = serde_json::from_str(
			r#"{
				"id": 7, "name": "whoami", "type": "link", "img": "windows",
				"timestamp": "2024-03-01 10:00:05",
				"attrs": {"status": 124, "host": "WS01", "pid": null}
			}"#,
		)
		.unwrap();
		assert_eq!(
			tooltip_lines(&node),
			vec![
				"created: 2024-03-01 10:00:05",
				"host: WS01",
				"status: timeout"
			]
		);
	}

	#[test]
	fn tactic_tooltip_leads_with_its_classification() {
		let node: GraphNode = serde_json::from_str(
			r#"{
				"id": 3, "name": "discovery", "type": "tactic",
				"attrs": {"tactic": "discovery", "technique": "T1033"}
			}"#,
		)
		.unwrap();
		assert_eq!(
			tooltip_lines(&node),
			vec!["tactic: discovery", "technique: T1033"]
		);
	}
}
