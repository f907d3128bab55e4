//! debrief-graph: browser-side operation debrief report.
//!
//! This crate fetches operation results, tabular summaries, and graph data
//! from the debrief reporting API and renders HTML tables plus five
//! interactive force-directed graph views (steps, attack path, tactic,
//! technique, fact) with playback and export actions.

use std::collections::BTreeMap;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, error, info};

pub mod api;
pub mod components;

pub use components::debrief_graph::{DebriefGraphCanvas, GraphData, GraphKind};

use components::debrief_graph::{NodeId, status_name};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("debrief-graph: logging initialized");
}

fn parse_operation_ids(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

/// Main application component: operation selection, report tables, the
/// five graph views, and export actions.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let operations_input = RwSignal::new(String::new());
	let selected_ops = RwSignal::new(Vec::<String>::new());
	let report = RwSignal::new(api::DebriefReport::default());
	let active_view = RwSignal::new(GraphKind::Steps);
	let fact_warning = RwSignal::new(None::<String>);
	let notice = RwSignal::new(None::<String>);
	let step_output = RwSignal::new(None::<String>);

	// Supersede marker for in-flight fetches: responses carrying a stale
	// generation are dropped instead of clobbering a newer selection.
	let generation = StoredValue::new(0u64);

	let steps_data = RwSignal::new(GraphData::default());
	let attackpath_data = RwSignal::new(GraphData::default());
	let tactic_data = RwSignal::new(GraphData::default());
	let technique_data = RwSignal::new(GraphData::default());
	let fact_data = RwSignal::new(GraphData::default());

	let apply_graph = move |kind: GraphKind, data: GraphData| match kind {
		GraphKind::Steps => steps_data.set(data),
		GraphKind::Attackpath => attackpath_data.set(data),
		GraphKind::Tactic => tactic_data.set(data),
		GraphKind::Technique => technique_data.set(data),
		GraphKind::Fact => fact_data.set(data),
	};

	let load = move |_| {
		let ops = parse_operation_ids(&operations_input.get());
		selected_ops.set(ops.clone());
		notice.set(None);
		step_output.set(None);
		let current = generation.get_value() + 1;
		generation.set_value(current);

		{
			let ops = ops.clone();
			spawn_local(async move {
				let fetched = api::fetch_report(&ops).await;
				if generation.get_value() != current {
					return;
				}
				match fetched {
					Ok(data) => report.set(data),
					Err(err) => {
						error!("report fetch failed: {err}");
						report.set(api::DebriefReport::default());
					}
				}
			});
		}

		// Views fetch independently: one failing never blocks the others,
		// and no cross-view ordering is assumed.
		for kind in GraphKind::ALL {
			let ops = ops.clone();
			spawn_local(async move {
				let fetched = api::fetch_graph(kind, &ops).await;
				if generation.get_value() != current {
					return;
				}
				match fetched {
					Ok(data) => apply_graph(kind, data),
					Err(err) => {
						error!("{} graph fetch failed: {err}", kind.query_key());
						apply_graph(kind, GraphData::default());
					}
				}
			});
		}
	};

	let export_pdf = move |_| {
		let ops = selected_ops.get();
		spawn_local(async move {
			match api::export_pdf(&ops, &BTreeMap::new(), &[], None).await {
				Ok(file) => notice.set(Some(format!("Exported {}", file.filename))),
				Err(api::ApiError::UnexpectedPayload) => {
					notice.set(Some(api::EXPORT_NOTICE.to_string()));
				}
				Err(err) => {
					error!("pdf export failed: {err}");
					notice.set(Some("Export failed.".to_string()));
				}
			}
		});
	};

	let export_json = move |_| {
		let ops = selected_ops.get();
		spawn_local(async move {
			match api::export_json(&ops).await {
				Ok(file) => notice.set(Some(format!("Exported {}", file.filename))),
				Err(api::ApiError::UnexpectedPayload) => {
					notice.set(Some(api::EXPORT_NOTICE.to_string()));
				}
				Err(err) => {
					error!("json export failed: {err}");
					notice.set(Some("Export failed.".to_string()));
				}
			}
		});
	};

	let show_step_output = move |id: NodeId| {
		spawn_local(async move {
			match api::fetch_step_result(&id).await {
				Ok(result) => {
					let decoded = web_sys::window()
						.and_then(|w| w.atob(&result.output).ok())
						.unwrap_or(result.output);
					step_output.set(Some(decoded));
				}
				Err(err) => error!("step result fetch failed: {err}"),
			}
		});
	};

	let operation_summaries = move || {
		report
			.get()
			.operations
			.iter()
			.map(|op| {
				let start = op.start.clone().unwrap_or_else(|| "unknown".to_string());
				view! {
					<li>
						<b>{op.name.clone()}</b>
						{format!(" ({}, {} steps, started {start})", op.state, op.chain.len())}
					</li>
				}
			})
			.collect_view()
	};

	let step_rows = move || {
		report
			.get()
			.operations
			.iter()
			.flat_map(|op| op.chain.iter())
			.map(|step| {
				let status = step.status.map_or("queued", status_name);
				let id = step.id.clone();
				view! {
					<tr on:click=move |_| {
						if let Some(id) = id.clone() {
							show_step_output(id);
						}
					}>
						<td>{status}</td>
						<td>{step.host.clone()}</td>
						<td>{step.ability.name.clone()}</td>
						<td>{step.ability.technique_name.clone()}</td>
					</tr>
				}
			})
			.collect_view()
	};

	let fact_rows = move || {
		let mut by_trait: BTreeMap<String, Vec<String>> = BTreeMap::new();
		for op in &report.get().operations {
			for step in &op.chain {
				for fact in &step.facts {
					let value = match &fact.value {
						serde_json::Value::String(s) => s.clone(),
						other => other.to_string(),
					};
					by_trait.entry(fact.trait_name.clone()).or_default().push(value);
				}
			}
		}
		by_trait
			.into_iter()
			.map(|(trait_name, values)| {
				view! {
					<tr>
						<td>{trait_name}</td>
						<td>{values.join(", ")}</td>
					</tr>
				}
			})
			.collect_view()
	};

	let ttp_rows = move || {
		report
			.get()
			.ttps
			.iter()
			.map(|(key, tactic)| {
				let techniques = tactic
					.techniques
					.iter()
					.map(|(id, name)| format!("{id}: {name}"))
					.collect::<Vec<_>>()
					.join(", ");
				let name = if tactic.name.is_empty() {
					key.clone()
				} else {
					tactic.name.clone()
				};
				view! {
					<tr>
						<td>{name}</td>
						<td>{techniques}</td>
					</tr>
				}
			})
			.collect_view()
	};

	let tab_style = move |kind: GraphKind| {
		move || {
			if active_view.get() == kind {
				"display: block;"
			} else {
				"display: none;"
			}
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Operations Debrief" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="debrief">
			<h1>"Operations Debrief"</h1>

			<div class="debrief-controls">
				<input
					type="text"
					placeholder="operation ids, comma-separated"
					prop:value=operations_input
					on:input=move |ev| operations_input.set(event_target_value(&ev))
				/>
				<button on:click=load>"Load"</button>
				<button on:click=export_pdf>"Export PDF"</button>
				<button on:click=export_json>"Export JSON"</button>
			</div>

			{move || {
				notice.get().map(|message| view! { <div class="debrief-notice">{message}</div> })
			}}

			<ul class="operation-summaries">{operation_summaries}</ul>

			<h2>"Steps"</h2>
			<table id="report-steps">
				<thead>
					<tr>
						<th>"Status"</th>
						<th>"Host"</th>
						<th>"Ability"</th>
						<th>"Technique"</th>
					</tr>
				</thead>
				<tbody>{step_rows}</tbody>
			</table>
			{move || {
				step_output.get().map(|output| view! { <pre class="step-output">{output}</pre> })
			}}

			<h2>"Facts"</h2>
			<table id="report-facts">
				<thead>
					<tr>
						<th>"Trait"</th>
						<th>"Values"</th>
					</tr>
				</thead>
				<tbody>{fact_rows}</tbody>
			</table>

			<h2>"Tactics and Techniques"</h2>
			<table id="report-ttps">
				<thead>
					<tr>
						<th>"Tactic"</th>
						<th>"Techniques"</th>
					</tr>
				</thead>
				<tbody>{ttp_rows}</tbody>
			</table>

			<h2>"Graphs"</h2>
			<div class="graph-tabs">
				{GraphKind::ALL
					.into_iter()
					.map(|kind| {
						view! {
							<button
								class:active=move || active_view.get() == kind
								on:click=move |_| active_view.set(kind)
							>
								{kind.title()}
							</button>
						}
					})
					.collect_view()}
			</div>

			{move || {
				fact_warning
					.get()
					.map(|message| view! { <div class="fact-limit-warning">{message}</div> })
			}}

			<div id="debrief-graph">
				<div style=tab_style(GraphKind::Steps)>
					<DebriefGraphCanvas data=steps_data kind=GraphKind::Steps />
				</div>
				<div style=tab_style(GraphKind::Attackpath)>
					<DebriefGraphCanvas data=attackpath_data kind=GraphKind::Attackpath />
				</div>
				<div style=tab_style(GraphKind::Tactic)>
					<DebriefGraphCanvas data=tactic_data kind=GraphKind::Tactic />
				</div>
				<div style=tab_style(GraphKind::Technique)>
					<DebriefGraphCanvas data=technique_data kind=GraphKind::Technique />
				</div>
				<div style=tab_style(GraphKind::Fact)>
					<DebriefGraphCanvas
						data=fact_data
						kind=GraphKind::Fact
						fact_warning=fact_warning.write_only()
					/>
				</div>
			</div>
		</div>
	}
}
