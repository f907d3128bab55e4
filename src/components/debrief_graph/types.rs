//! Wire data structures for the debrief graph views.
//!
//! These mirror the payloads served by the debrief reporting API:
//! `GET /plugin/debrief/graph?type=..&operations=..` returns a flat
//! `{ nodes: [...], links: [...] }` document per view.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Node identifier. The backend emits integers for infrastructure nodes
/// (the C2 root is id 0) and strings for operation-scoped objects.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
	/// Numeric id.
	Int(i64),
	/// String id.
	Text(String),
}

impl std::fmt::Display for NodeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			NodeId::Int(n) => write!(f, "{n}"),
			NodeId::Text(s) => write!(f, "{s}"),
		}
	}
}

/// Node category. Unrecognized categories deserialize to [`NodeKind::Unknown`]
/// and render with the fallback icon rather than failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
	/// An adversary-emulation run.
	Operation,
	/// A deployed agent.
	Agent,
	/// One executed step of an operation.
	Link,
	/// A discovered trait/value pair.
	Fact,
	/// ATT&CK tactic grouping.
	Tactic,
	/// ATT&CK technique grouping.
	TechniqueName,
	/// The command-and-control server root.
	C2,
	/// Anything the backend sends that this build does not know about.
	#[default]
	#[serde(other)]
	Unknown,
}

impl NodeKind {
	/// Lowercase wire token, also used as the icon table key.
	pub fn token(self) -> &'static str {
		match self {
			NodeKind::Operation => "operation",
			NodeKind::Agent => "agent",
			NodeKind::Link => "link",
			NodeKind::Fact => "fact",
			NodeKind::Tactic => "tactic",
			NodeKind::TechniqueName => "technique_name",
			NodeKind::C2 => "c2",
			NodeKind::Unknown => "unknown",
		}
	}

	/// Many-body charge strength for the layout. More negative pushes
	/// neighbors further away.
	pub fn charge(self) -> f64 {
		match self {
			NodeKind::C2 => -200.0,
			NodeKind::Operation => -100.0,
			NodeKind::Agent => -200.0,
			NodeKind::Link => -150.0,
			NodeKind::Fact => -50.0,
			NodeKind::Tactic => -200.0,
			NodeKind::TechniqueName => -200.0,
			NodeKind::Unknown => -200.0,
		}
	}
}

/// Edge category, mapped to the spring rest length used by the layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
	/// C2 server to agent beacon.
	AgentContact,
	/// Chronological step chain within an operation.
	NextLink,
	/// Operation or step to the agent it ran on.
	HasAgent,
	/// Fact provenance (step to fact, fact to derived fact).
	Relationship,
	/// Host-to-host lateral movement.
	Attackpath,
	/// Unrecognized edge category.
	#[default]
	#[serde(other)]
	Unknown,
}

impl EdgeKind {
	/// Target spring length in world units.
	pub fn rest_length(self) -> f64 {
		match self {
			EdgeKind::AgentContact => 100.0,
			EdgeKind::NextLink => 50.0,
			EdgeKind::HasAgent => 50.0,
			EdgeKind::Relationship => 100.0,
			EdgeKind::Attackpath => 100.0,
			EdgeKind::Unknown => 60.0,
		}
	}
}

/// A node in a debrief graph payload.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier within one payload. Links reference these.
	pub id: NodeId,
	/// Display name. Link nodes suppress their label at render time.
	#[serde(default)]
	pub name: String,
	/// Node category.
	#[serde(rename = "type", default)]
	pub kind: NodeKind,
	/// Icon hint. A single-token value selects an icon directly (e.g. a
	/// platform name); multi-word values fall back to the category icon.
	#[serde(default)]
	pub img: String,
	/// Step status code, when the node represents an executed step.
	#[serde(default)]
	pub status: Option<i32>,
	/// Creation time, `%Y-%m-%d %H:%M:%S`, used for playback ordering.
	#[serde(default)]
	pub timestamp: Option<String>,
	/// Id of the owning operation, set on operation-scoped nodes.
	#[serde(default)]
	pub operation: Option<NodeId>,
	/// Free-form attributes rendered in the tooltip, keyed in stable order.
	#[serde(default)]
	pub attrs: BTreeMap<String, serde_json::Value>,
}

impl GraphNode {
	/// Infrastructure roots stay visible at playback start.
	pub fn is_infrastructure(&self) -> bool {
		self.kind == NodeKind::C2 || self.img == "server"
	}
}

/// A directed edge between two nodes of one payload.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Source node id.
	pub source: NodeId,
	/// Target node id.
	pub target: NodeId,
	/// Edge category.
	#[serde(rename = "type", default)]
	pub kind: EdgeKind,
}

/// Complete graph payload for one view: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// All nodes, in server emission order (playback tie-break order).
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// All edges. Edges referencing unknown node ids are dropped on build.
	#[serde(default)]
	pub links: Vec<GraphLink>,
}

/// The five debrief graph views. Each owns an independent node set,
/// simulation, and playback cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphKind {
	/// C2, agents, operations, and every executed step.
	Steps,
	/// Compromised hosts linked by lateral-movement method.
	Attackpath,
	/// Steps grouped under ATT&CK tactics.
	Tactic,
	/// Steps grouped under ATT&CK techniques.
	Technique,
	/// Discovered facts and their provenance.
	Fact,
}

impl GraphKind {
	/// All views, in display order.
	pub const ALL: [GraphKind; 5] = [
		GraphKind::Steps,
		GraphKind::Attackpath,
		GraphKind::Tactic,
		GraphKind::Technique,
		GraphKind::Fact,
	];

	/// Value of the `type` query parameter on the graph endpoint.
	pub fn query_key(self) -> &'static str {
		match self {
			GraphKind::Steps => "steps",
			GraphKind::Attackpath => "attackpath",
			GraphKind::Tactic => "tactic",
			GraphKind::Technique => "technique",
			GraphKind::Fact => "fact",
		}
	}

	/// Tab label.
	pub fn title(self) -> &'static str {
		match self {
			GraphKind::Steps => "Steps",
			GraphKind::Attackpath => "Attack Path",
			GraphKind::Tactic => "Tactics",
			GraphKind::Technique => "Techniques",
			GraphKind::Fact => "Facts",
		}
	}
}
