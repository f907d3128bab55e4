//! Icon assignment for graph nodes and legend entries.

use super::types::{GraphNode, NodeKind};

/// Fallback icon for categories this build does not know about.
pub const UNKNOWN_ICON: &str = "/debrief/img/unknown.svg";

/// Icon key to SVG asset path. Keys cover node categories, agent
/// platforms, and the ATT&CK tactic names used by the tactic view.
pub const ICONS: &[(&str, &str)] = &[
	("server", "/debrief/img/cloud.svg"),
	("operation", "/debrief/img/operation.svg"),
	("link", "/debrief/img/link.svg"),
	("fact", "/debrief/img/star.svg"),
	("darwin", "/debrief/img/darwin.svg"),
	("windows", "/debrief/img/windows.svg"),
	("linux", "/debrief/img/linux.svg"),
	("tactic", "/debrief/img/tactic.svg"),
	("technique_name", "/debrief/img/technique.svg"),
	("collection", "/debrief/img/collection.svg"),
	("credential-access", "/debrief/img/credaccess.svg"),
	("defense-evasion", "/debrief/img/defevasion.svg"),
	("discovery", "/debrief/img/discovery.svg"),
	("execution", "/debrief/img/execution.svg"),
	("exfiltration", "/debrief/img/exfil.svg"),
	("impact", "/debrief/img/impact.svg"),
	("lateral-movement", "/debrief/img/latmove.svg"),
	("persistence", "/debrief/img/persistence.svg"),
	("privilege-escalation", "/debrief/img/privesc.svg"),
	("initial-access", "/debrief/img/access.svg"),
	("command-and-control", "/debrief/img/commandcontrol.svg"),
	("unknown", "/debrief/img/unknown.svg"),
];

/// Asset path for an icon key, if the key is known.
pub fn icon_path(key: &str) -> Option<&'static str> {
	ICONS.iter().find(|(k, _)| *k == key).map(|(_, p)| *p)
}

/// Icon key for a node: the `img` hint when it is a single known token,
/// else the node category, else `unknown`.
pub fn icon_key_for(node: &GraphNode) -> &'static str {
	if !node.img.contains(' ')
		&& let Some(&(key, _)) = ICONS.iter().find(|(k, _)| *k == node.img)
	{
		return key;
	}
	if icon_path(node.kind.token()).is_some() {
		return node.kind.token();
	}
	"unknown"
}

/// Asset path a node renders with. Link nodes swap to the `link` icon.
pub fn icon_path_for(node: &GraphNode) -> &'static str {
	let key = if node.kind == NodeKind::Link {
		"link"
	} else {
		icon_key_for(node)
	};
	icon_path(key).unwrap_or(UNKNOWN_ICON)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::debrief_graph::types::NodeId;

	fn node(kind: NodeKind, img: &str) -> GraphNode {
		GraphNode {
			id: NodeId::Int(1),
			name: "n".into(),
			kind,
			img: img.into(),
			status: None,
			timestamp: None,
			operation: None,
			attrs: Default::default(),
		}
	}

	#[test]
	fn platform_hint_beats_category() {
		assert_eq!(icon_key_for(&node(NodeKind::Agent, "windows")), "windows");
	}

	#[test]
	fn multiword_hint_falls_back_to_category() {
		assert_eq!(icon_key_for(&node(NodeKind::Fact, "host users found")), "fact");
	}

	#[test]
	fn unknown_category_falls_back_to_unknown_icon() {
		let n = node(NodeKind::Unknown, "no such icon");
		assert_eq!(icon_key_for(&n), "unknown");
		assert_eq!(icon_path_for(&n), "/debrief/img/unknown.svg");
	}

	#[test]
	fn link_nodes_swap_to_link_icon() {
		let n = node(NodeKind::Link, "windows");
		assert_eq!(icon_path_for(&n), "/debrief/img/link.svg");
	}
}
