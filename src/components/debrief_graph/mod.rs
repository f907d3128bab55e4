//! Interactive force-directed debrief graph component.
//!
//! Renders one of the five debrief views (steps, attack path, tactic,
//! technique, fact) on an HTML canvas with:
//! - Physics-based node positioning via a force simulation
//! - Pan, zoom, and pin-in-place node dragging
//! - A deduplicated legend with per-category icons
//! - Chronological playback revealing nodes in timestamp order
//! - A per-operation cap on displayed fact nodes
//!
//! The simulation, playback, legend, and fact-cap modules are pure state
//! machines; only [`component`] and [`render`] touch the DOM.

mod component;
mod facts;
mod icons;
mod legend;
mod playback;
mod render;
mod simulation;
mod state;
mod status;
mod tooltip;
mod types;

pub use component::DebriefGraphCanvas;
pub use facts::FACT_DISPLAY_LIMIT;
pub use status::status_name;
pub use types::{GraphData, GraphKind, GraphLink, GraphNode, NodeId, NodeKind};
