//! Chronological playback of a graph view.
//!
//! Playback orders the view's nodes by creation time and exposes a cursor
//! over that order: nodes before the cursor are revealed, infrastructure
//! roots (the C2 server) are always visible, and an edge shows only when
//! both endpoints do. Every view owns its own controller; cursors are
//! never shared between views.

use chrono::NaiveDateTime;
use log::warn;

use super::types::GraphNode;

/// Server timestamp format on graph nodes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reveal cadence while playing, one node per interval.
pub const STEP_INTERVAL_MS: u32 = 1_000;

fn parse_timestamp(node: &GraphNode) -> Option<NaiveDateTime> {
	let raw = node.timestamp.as_deref()?;
	match NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
		Ok(ts) => Some(ts),
		Err(err) => {
			warn!("unparseable node timestamp {raw:?}: {err}");
			None
		}
	}
}

/// Playback state for one graph view.
pub struct Playback {
	// Node indices in reveal order: ascending timestamp, payload order on
	// ties, untimed nodes first.
	order: Vec<usize>,
	// Position of each node in `order`; None marks an always-visible root.
	rank: Vec<Option<usize>>,
	// Number of revealed entries of `order`.
	cursor: usize,
	paused: bool,
}

impl Playback {
	/// Build the reveal order for a node set. Starts fully revealed and
	/// paused, so a fresh graph shows everything until the user engages.
	pub fn new(nodes: &[GraphNode]) -> Self {
		let mut timed: Vec<(Option<NaiveDateTime>, usize)> = nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| !n.is_infrastructure())
			.map(|(i, n)| (parse_timestamp(n), i))
			.collect();
		// Stable sort keeps payload order for equal or missing timestamps.
		timed.sort_by(|a, b| a.0.cmp(&b.0));

		let order: Vec<usize> = timed.into_iter().map(|(_, i)| i).collect();
		let mut rank = vec![None; nodes.len()];
		for (pos, &index) in order.iter().enumerate() {
			rank[index] = Some(pos);
		}

		let cursor = order.len();
		Self {
			order,
			rank,
			cursor,
			paused: true,
		}
	}

	/// Whether a node is currently revealed.
	pub fn is_revealed(&self, node_index: usize) -> bool {
		match self.rank.get(node_index) {
			Some(Some(pos)) => *pos < self.cursor,
			// Roots, and anything out of range, stay visible.
			_ => true,
		}
	}

	/// Reveal the next hidden node. Returns false when nothing remained
	/// hidden; either way the controller auto-pauses once the end is
	/// reached so a driving timer knows to stop.
	pub fn step_forward(&mut self) -> bool {
		if self.cursor < self.order.len() {
			self.cursor += 1;
			if self.cursor == self.order.len() {
				self.paused = true;
			}
			true
		} else {
			self.paused = true;
			false
		}
	}

	/// Hide the most recently revealed node, never the very first one.
	pub fn step_back(&mut self) {
		if self.cursor > 1 {
			self.cursor -= 1;
		}
	}

	/// Hide everything except the infrastructure roots.
	pub fn seek_start(&mut self) {
		self.cursor = 0;
	}

	/// Reveal every node.
	pub fn seek_end(&mut self) {
		self.cursor = self.order.len();
	}

	/// Whether the cursor sits past the last node.
	pub fn at_end(&self) -> bool {
		self.cursor == self.order.len()
	}

	/// Whether the repeating reveal timer should be idle.
	pub fn paused(&self) -> bool {
		self.paused
	}

	/// Pause or resume. Resuming at the end restarts from the beginning.
	pub fn set_paused(&mut self, paused: bool) {
		if !paused && self.at_end() {
			self.seek_start();
		}
		self.paused = paused;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::debrief_graph::types::{NodeId, NodeKind};

	fn node(id: i64, kind: NodeKind, timestamp: Option<&str>) -> GraphNode {
		GraphNode {
			id: NodeId::Int(id),
			name: format!("n{id}"),
			kind,
			img: String::new(),
			status: None,
			timestamp: timestamp.map(str::to_string),
			operation: None,
			attrs: Default::default(),
		}
	}

	fn timed_set() -> Vec<GraphNode> {
		vec![
			node(0, NodeKind::C2, None),
			node(1, NodeKind::Link, Some("2024-03-01 10:00:00")),
			node(2, NodeKind::Link, Some("2024-03-01 10:00:05")),
			node(3, NodeKind::Link, Some("2024-03-01 10:00:09")),
		]
	}

	fn revealed(p: &Playback, n: usize) -> Vec<usize> {
		(0..n).filter(|&i| p.is_revealed(i)).collect()
	}

	#[test]
	fn steps_reveal_in_chronological_order_then_auto_pause() {
		let nodes = timed_set();
		let mut p = Playback::new(&nodes);
		p.seek_start();
		assert_eq!(revealed(&p, 4), vec![0], "only the root at start");

		assert!(p.step_forward());
		assert_eq!(revealed(&p, 4), vec![0, 1]);
		assert!(p.step_forward());
		assert_eq!(revealed(&p, 4), vec![0, 1, 2]);
		assert!(p.step_forward());
		assert_eq!(revealed(&p, 4), vec![0, 1, 2, 3]);

		// Exhausted: the fourth step is a no-op that also pauses.
		assert!(!p.step_forward());
		assert!(p.paused());
		assert_eq!(revealed(&p, 4), vec![0, 1, 2, 3]);
	}

	#[test]
	fn payload_order_is_not_reveal_order() {
		let nodes = vec![
			node(0, NodeKind::C2, None),
			node(1, NodeKind::Link, Some("2024-03-01 10:00:09")),
			node(2, NodeKind::Link, Some("2024-03-01 10:00:00")),
		];
		let mut p = Playback::new(&nodes);
		p.seek_start();
		p.step_forward();
		assert_eq!(revealed(&p, 3), vec![0, 2], "earliest timestamp first");
	}

	#[test]
	fn seek_round_trip_is_idempotent() {
		let nodes = timed_set();
		let mut p = Playback::new(&nodes);

		p.seek_end();
		let once = revealed(&p, 4);
		p.seek_start();
		p.seek_end();
		assert_eq!(revealed(&p, 4), once);
	}

	#[test]
	fn step_back_never_hides_the_first_node() {
		let nodes = timed_set();
		let mut p = Playback::new(&nodes);
		p.seek_start();
		p.step_forward();
		p.step_forward();

		p.step_back();
		assert_eq!(revealed(&p, 4), vec![0, 1]);
		p.step_back();
		p.step_back();
		assert_eq!(revealed(&p, 4), vec![0, 1], "first node stays revealed");
	}

	#[test]
	fn resuming_play_at_the_end_rewinds() {
		let nodes = timed_set();
		let mut p = Playback::new(&nodes);
		assert!(p.at_end());
		p.set_paused(false);
		assert!(!p.paused());
		assert_eq!(revealed(&p, 4), vec![0], "rewound to the roots");
	}

	#[test]
	fn unparseable_timestamps_fall_back_to_payload_order() {
		let nodes = vec![
			node(0, NodeKind::Link, Some("not a time")),
			node(1, NodeKind::Link, Some("also wrong")),
			node(2, NodeKind::Link, Some("2024-03-01 10:00:00")),
		];
		let mut p = Playback::new(&nodes);
		p.seek_start();
		p.step_forward();
		assert_eq!(revealed(&p, 3), vec![0]);
		p.step_forward();
		assert_eq!(revealed(&p, 3), vec![0, 1]);
	}
}
