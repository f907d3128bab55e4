//! REST client for the debrief reporting backend.
//!
//! Thin typed wrappers over the plugin endpoints. Every function returns
//! `Result` and never panics on bad payloads; callers log failures and
//! leave the affected view empty. One failed view never blocks another:
//! each graph type is fetched independently.

use std::collections::BTreeMap;

use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::components::debrief_graph::{GraphData, GraphKind, NodeId};

/// Inline notice shown when an export endpoint answers with something
/// other than a file descriptor.
pub const EXPORT_NOTICE: &str = "Please select at least one operation to export.";

/// Errors surfaced by the reporting API client.
#[derive(Debug, Error)]
pub enum ApiError {
	/// Transport or decode failure from the fetch layer.
	#[error("request failed: {0}")]
	Transport(#[from] gloo_net::Error),
	/// Non-2xx response.
	#[error("server returned HTTP {0}")]
	Status(u16),
	/// The body parsed, but not into the expected shape (the export
	/// endpoints answer with a bare string when nothing was selected).
	#[error("unexpected response payload")]
	UnexpectedPayload,
}

/// A fact attached to a step: trait/value pair.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FactRecord {
	/// Fact trait, e.g. `host.user.name`.
	#[serde(rename = "trait", default)]
	pub trait_name: String,
	/// Discovered value.
	#[serde(default)]
	pub value: serde_json::Value,
}

/// The ability a step executed.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AbilityRecord {
	/// Ability display name.
	#[serde(default)]
	pub name: String,
	/// ATT&CK technique name.
	#[serde(default)]
	pub technique_name: String,
	/// ATT&CK technique id.
	#[serde(default)]
	pub technique_id: String,
	/// ATT&CK tactic.
	#[serde(default)]
	pub tactic: String,
}

/// One executed step of an operation chain.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StepRecord {
	/// Step id, used to look up raw command output.
	#[serde(default)]
	pub id: Option<NodeId>,
	/// Step status code; absent means still queued.
	#[serde(default)]
	pub status: Option<i32>,
	/// Host the step ran on.
	#[serde(default)]
	pub host: String,
	/// Executed ability.
	#[serde(default)]
	pub ability: AbilityRecord,
	/// Completion time.
	#[serde(default)]
	pub finish: Option<String>,
	/// Facts the step collected.
	#[serde(default)]
	pub facts: Vec<FactRecord>,
}

/// One selected operation with its executed chain.
#[derive(Clone, Debug, Deserialize)]
pub struct OperationRecord {
	/// Operation id.
	pub id: NodeId,
	/// Operation name.
	#[serde(default)]
	pub name: String,
	/// Lifecycle state, e.g. `finished`.
	#[serde(default)]
	pub state: String,
	/// Start time.
	#[serde(default)]
	pub start: Option<String>,
	/// Executed steps in order.
	#[serde(default)]
	pub chain: Vec<StepRecord>,
}

/// A deployed agent.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AgentRecord {
	/// Agent identifier.
	#[serde(default)]
	pub paw: String,
	/// Host name.
	#[serde(default)]
	pub host: String,
	/// Platform, e.g. `linux`.
	#[serde(default)]
	pub platform: String,
	/// User the agent runs as.
	#[serde(default)]
	pub username: String,
	/// Privilege level.
	#[serde(default)]
	pub privilege: String,
	/// Executable name.
	#[serde(default)]
	pub exe_name: String,
}

/// ATT&CK tactic summary across the selected operations.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TacticRecord {
	/// Tactic display name.
	#[serde(default)]
	pub name: String,
	/// Technique id to technique name.
	#[serde(default)]
	pub techniques: BTreeMap<String, String>,
}

/// Full debrief report for a selection of operations.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DebriefReport {
	/// Selected operations with their chains.
	#[serde(default)]
	pub operations: Vec<OperationRecord>,
	/// Agents involved.
	#[serde(default)]
	pub agents: Vec<AgentRecord>,
	/// Tactic/technique rollup, keyed by tactic.
	#[serde(default)]
	pub ttps: BTreeMap<String, TacticRecord>,
}

/// Exported file descriptor returned by the PDF/JSON endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct ExportFile {
	/// Server-chosen file name.
	pub filename: String,
}

/// Raw command/output lookup for one step.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StepResult {
	/// Base64-encoded command output.
	#[serde(default)]
	pub output: String,
}

fn ensure_ok(response: &gloo_net::http::Response) -> Result<(), ApiError> {
	if response.ok() {
		Ok(())
	} else {
		Err(ApiError::Status(response.status()))
	}
}

/// Fetch the tabular report for a selection of operations.
pub async fn fetch_report(operations: &[String]) -> Result<DebriefReport, ApiError> {
	let response = Request::post("/plugin/debrief/report")
		.json(&json!({ "operations": operations }))?
		.send()
		.await?;
	ensure_ok(&response)?;
	Ok(response.json().await?)
}

/// Fetch one graph view's nodes and links.
pub async fn fetch_graph(kind: GraphKind, operations: &[String]) -> Result<GraphData, ApiError> {
	let url = format!(
		"/plugin/debrief/graph?type={}&operations={}",
		kind.query_key(),
		operations.join(",")
	);
	let response = Request::get(&url).send().await?;
	ensure_ok(&response)?;
	Ok(response.json().await?)
}

/// Fetch the raw output of one executed step.
pub async fn fetch_step_result(link_id: &NodeId) -> Result<StepResult, ApiError> {
	let response = Request::post("/api/rest")
		.json(&json!({ "index": "result", "link_id": link_id.to_string() }))?
		.send()
		.await?;
	ensure_ok(&response)?;
	Ok(response.json().await?)
}

// The export endpoints answer with a JSON object on success and a bare
// string when the selection was unusable, so both parse the body text
// rather than letting a decode error disguise the latter.
async fn export_file(response: gloo_net::http::Response) -> Result<ExportFile, ApiError> {
	ensure_ok(&response)?;
	let text = response.text().await?;
	serde_json::from_str(&text).map_err(|_| ApiError::UnexpectedPayload)
}

/// Trigger a PDF export of the selected operations.
pub async fn export_pdf(
	operations: &[String],
	graphs: &BTreeMap<String, String>,
	sections: &[String],
	header_logo: Option<&str>,
) -> Result<ExportFile, ApiError> {
	let response = Request::post("/plugin/debrief/pdf")
		.json(&json!({
			"operations": operations,
			"graphs": graphs,
			"report-sections": sections,
			"header-logo": header_logo,
		}))?
		.send()
		.await?;
	export_file(response).await
}

/// Trigger a JSON export of the selected operations.
pub async fn export_json(operations: &[String]) -> Result<ExportFile, ApiError> {
	let response = Request::post("/plugin/debrief/json")
		.json(&json!({ "operations": operations }))?
		.send()
		.await?;
	export_file(response).await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn report_payload_parses_with_partial_fields() {
		let report: DebriefReport = serde_json::from_str(
			r#"{
				"operations": [{
					"id": "op-1",
					"name": "discovery run",
					"state": "finished",
					"chain": [
						{"id": 7, "status": 0, "host": "WS01",
						 "ability": {"name": "Identify users", "technique_name": "System Owner/User Discovery"},
						 "facts": [{"trait": "host.user.name", "value": "alice"}]},
						{"host": "WS02"}
					]
				}],
				"agents": [{"paw": "abc123", "host": "WS01", "platform": "windows"}],
				"ttps": {"discovery": {"name": "Discovery", "techniques": {"T1033": "System Owner/User Discovery"}}}
			}"#,
		)
		.unwrap();

		assert_eq!(report.operations.len(), 1);
		let chain = &report.operations[0].chain;
		assert_eq!(chain[0].status, Some(0));
		assert_eq!(chain[0].facts[0].trait_name, "host.user.name");
		assert_eq!(chain[1].status, None, "missing status means queued");
		assert_eq!(report.ttps["discovery"].techniques.len(), 1);
	}

	#[test]
	fn export_descriptor_requires_an_object() {
		let ok: Result<ExportFile, _> =
			serde_json::from_str(r#"{"filename": "debrief_2024-03-01", "pdf_bytes": "..."}"#);
		assert_eq!(ok.unwrap().filename, "debrief_2024-03-01");

		let bare: Result<ExportFile, _> =
			serde_json::from_str(r#""No or multiple operations selected""#);
		assert!(bare.is_err());
	}
}
