//! Force-directed layout engine for the debrief graphs.
//!
//! Each tick runs a fixed force pipeline: many-body repulsion approximated
//! through a quadtree (Barnes-Hut), spring forces along edges toward a
//! per-category rest length, a weak pull toward the view center, velocity
//! integration, and a positional collision pass that enforces a minimum
//! node separation. Integration is scaled by a decaying temperature
//! (`alpha`); once alpha falls below [`ALPHA_MIN`] with no target set the
//! simulation is at rest and [`ForceSimulation::tick`] becomes a no-op.
//!
//! Pinned nodes (user-dragged) never move from forces: they are skipped by
//! integration and the collision pass, but stay in the quadtree and spring
//! graph so they keep pushing and pulling their neighbors.

/// Temperature below which the simulation is considered at rest.
pub const ALPHA_MIN: f64 = 0.001;
/// Per-tick velocity retention factor.
pub const VELOCITY_DECAY: f64 = 0.6;
/// Barnes-Hut opening criterion: a quad is treated as one super-node when
/// `width / distance < THETA`.
pub const THETA: f64 = 0.8;
/// Repulsion interactions beyond this distance are ignored.
pub const DISTANCE_MAX: f64 = 100.0;
/// Collision radius per node; centers never rest closer than twice this.
pub const COLLIDE_RADIUS: f64 = 40.0;

const CENTER_STRENGTH: f64 = 0.05;
const COLLIDE_ITERATIONS: usize = 3;
const MAX_TREE_DEPTH: usize = 32;

/// One simulated node. Positions are world-space; velocities carry over
/// between ticks and decay by [`VELOCITY_DECAY`].
#[derive(Clone, Debug)]
pub struct SimNode {
	/// X position.
	pub x: f64,
	/// Y position.
	pub y: f64,
	/// X velocity.
	pub vx: f64,
	/// Y velocity.
	pub vy: f64,
	/// Many-body charge (negative repels).
	pub charge: f64,
	/// Held in place by a drag; excluded from force-driven movement.
	pub pinned: bool,
}

impl SimNode {
	/// Free node at a position with a given charge.
	pub fn new(x: f64, y: f64, charge: f64) -> Self {
		Self {
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			charge,
			pinned: false,
		}
	}
}

/// A spring between two node indices.
#[derive(Clone, Debug)]
pub struct SimEdge {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Target spring length in world units.
	pub rest_length: f64,
}

/// The layout engine owning node positions for one graph view.
pub struct ForceSimulation {
	nodes: Vec<SimNode>,
	edges: Vec<SimEdge>,
	// Per-edge spring strength and source-side bias, derived from node
	// degrees so hubs move less than their leaves.
	strength: Vec<f64>,
	bias: Vec<f64>,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
}

impl ForceSimulation {
	/// Build a simulation over a node/edge set. Edge indices must be in
	/// range; the graph build layer guarantees that. Alpha starts at 1.0.
	pub fn new(nodes: Vec<SimNode>, edges: Vec<SimEdge>, center: (f64, f64)) -> Self {
		let mut degree = vec![0usize; nodes.len()];
		for e in &edges {
			degree[e.source] += 1;
			degree[e.target] += 1;
		}
		let strength = edges
			.iter()
			.map(|e| 1.0 / degree[e.source].min(degree[e.target]).max(1) as f64)
			.collect();
		let bias = edges
			.iter()
			.map(|e| {
				let (ds, dt) = (degree[e.source] as f64, degree[e.target] as f64);
				ds / (ds + dt).max(1.0)
			})
			.collect();

		Self {
			nodes,
			edges,
			strength,
			bias,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
		}
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Reheat to full temperature, e.g. after a rebuild.
	pub fn restart(&mut self) {
		self.alpha = 1.0;
	}

	/// Set the temperature floor alpha decays toward. Drags bump this to
	/// 0.3 so neighbors keep reacting, and reset it to 0.0 on release.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Whether another tick would still move anything.
	pub fn active(&self) -> bool {
		!self.nodes.is_empty() && (self.alpha >= ALPHA_MIN || self.alpha_target >= ALPHA_MIN)
	}

	/// Pin a node at a position. Pinned nodes track the pointer during a
	/// drag and stay where they are dropped until the next rebuild.
	pub fn pin(&mut self, index: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(index) {
			node.pinned = true;
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}

	/// All nodes, for rendering and hit-testing.
	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	/// Advance the simulation one step. Returns false once at rest.
	pub fn tick(&mut self) -> bool {
		if !self.active() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

		self.apply_repulsion();
		self.apply_springs();
		self.apply_center();
		self.integrate();
		self.apply_collisions();
		true
	}

	fn apply_repulsion(&mut self) {
		let Some(tree) = QuadTree::build(&self.nodes) else {
			return;
		};
		for i in 0..self.nodes.len() {
			if self.nodes[i].pinned {
				continue;
			}
			let (fx, fy) = tree.force_at(self.nodes[i].x, self.nodes[i].y, i, self.alpha);
			self.nodes[i].vx += fx;
			self.nodes[i].vy += fy;
		}
	}

	fn apply_springs(&mut self) {
		for (idx, e) in self.edges.iter().enumerate() {
			let s = &self.nodes[e.source];
			let t = &self.nodes[e.target];
			let mut dx = (t.x + t.vx) - (s.x + s.vx);
			let mut dy = (t.y + t.vy) - (s.y + s.vy);
			if dx == 0.0 && dy == 0.0 {
				dx = 1e-6;
				dy = 1e-6;
			}
			let dist = (dx * dx + dy * dy).sqrt();
			let f = (dist - e.rest_length) / dist * self.alpha * self.strength[idx];
			let (fx, fy) = (dx * f, dy * f);
			let b = self.bias[idx];

			if !self.nodes[e.target].pinned {
				self.nodes[e.target].vx -= fx * b;
				self.nodes[e.target].vy -= fy * b;
			}
			if !self.nodes[e.source].pinned {
				self.nodes[e.source].vx += fx * (1.0 - b);
				self.nodes[e.source].vy += fy * (1.0 - b);
			}
		}
	}

	fn apply_center(&mut self) {
		let (cx, cy) = self.center;
		for node in self.nodes.iter_mut().filter(|n| !n.pinned) {
			node.vx += (cx - node.x) * CENTER_STRENGTH * self.alpha;
			node.vy += (cy - node.y) * CENTER_STRENGTH * self.alpha;
		}
	}

	fn integrate(&mut self) {
		for node in &mut self.nodes {
			if node.pinned {
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}
			node.vx *= VELOCITY_DECAY;
			node.vy *= VELOCITY_DECAY;
			node.x += node.vx;
			node.y += node.vy;
		}
	}

	// Positional separation so overlapping nodes end apart even after
	// alpha has decayed. A pinned node keeps its spot; its partner takes
	// the full correction.
	fn apply_collisions(&mut self) {
		let min_sep = 2.0 * COLLIDE_RADIUS;
		let min_sep2 = min_sep * min_sep;

		for _ in 0..COLLIDE_ITERATIONS {
			for i in 0..self.nodes.len() {
				for j in (i + 1)..self.nodes.len() {
					if self.nodes[i].pinned && self.nodes[j].pinned {
						continue;
					}
					let dx = self.nodes[j].x - self.nodes[i].x;
					let dy = self.nodes[j].y - self.nodes[i].y;
					let d2 = dx * dx + dy * dy;
					if d2 >= min_sep2 {
						continue;
					}

					let d = d2.sqrt();
					let (ux, uy) = if d > 1e-9 {
						(dx / d, dy / d)
					} else {
						// Coincident nodes: separate along a direction
						// derived from the indices so ticks stay
						// deterministic.
						let angle = (i * 31 + j) as f64;
						(angle.cos(), angle.sin())
					};
					let overlap = min_sep - d;

					if self.nodes[i].pinned {
						self.nodes[j].x += ux * overlap;
						self.nodes[j].y += uy * overlap;
					} else if self.nodes[j].pinned {
						self.nodes[i].x -= ux * overlap;
						self.nodes[i].y -= uy * overlap;
					} else {
						let half = overlap / 2.0;
						self.nodes[i].x -= ux * half;
						self.nodes[i].y -= uy * half;
						self.nodes[j].x += ux * half;
						self.nodes[j].y += uy * half;
					}
				}
			}
		}
	}
}

// ---------------------------------------------------------------------------
// Barnes-Hut quadtree

struct Body {
	index: usize,
	x: f64,
	y: f64,
	charge: f64,
}

enum CellBody {
	// Coincident or depth-capped points accumulate in one leaf.
	Leaf(Vec<Body>),
	Split([Option<Box<Cell>>; 4]),
}

struct Cell {
	cx: f64,
	cy: f64,
	half: f64,
	// Signed charge sum and |charge|-weighted centroid sums.
	charge: f64,
	weight: f64,
	wx: f64,
	wy: f64,
	body: CellBody,
}

impl Cell {
	fn new(cx: f64, cy: f64, half: f64) -> Self {
		Self {
			cx,
			cy,
			half,
			charge: 0.0,
			weight: 0.0,
			wx: 0.0,
			wy: 0.0,
			body: CellBody::Leaf(Vec::new()),
		}
	}

	fn quadrant(&self, x: f64, y: f64) -> usize {
		(usize::from(x >= self.cx)) | (usize::from(y >= self.cy) << 1)
	}

	fn insert(&mut self, body: Body, depth: usize) {
		let w = body.charge.abs();
		self.charge += body.charge;
		self.weight += w;
		self.wx += w * body.x;
		self.wy += w * body.y;

		if let CellBody::Leaf(bodies) = &mut self.body {
			let coincident = bodies
				.first()
				.is_some_and(|b| (b.x - body.x).abs() < 1e-9 && (b.y - body.y).abs() < 1e-9);
			if bodies.is_empty() || coincident || depth >= MAX_TREE_DEPTH {
				bodies.push(body);
				return;
			}
			// Second distinct point in this leaf: split and push the
			// existing bodies down one level.
			let existing = std::mem::take(bodies);
			self.body = CellBody::Split([None, None, None, None]);
			for b in existing {
				self.insert_into_child(b, depth);
			}
		}
		self.insert_into_child(body, depth);
	}

	fn insert_into_child(&mut self, body: Body, depth: usize) {
		let q = self.quadrant(body.x, body.y);
		let (cx, cy, half) = (self.cx, self.cy, self.half);
		if let CellBody::Split(children) = &mut self.body {
			let child = children[q].get_or_insert_with(|| Box::new(child_cell(cx, cy, half, q)));
			child.insert(body, depth + 1);
		}
	}

	fn centroid(&self) -> (f64, f64) {
		if self.weight > 0.0 {
			(self.wx / self.weight, self.wy / self.weight)
		} else {
			(self.cx, self.cy)
		}
	}

	fn accumulate(&self, x: f64, y: f64, skip: usize, alpha: f64, fx: &mut f64, fy: &mut f64) {
		let (px, py) = self.centroid();
		let dx = px - x;
		let dy = py - y;
		let l = dx * dx + dy * dy;
		let width = self.half * 2.0;

		// Far enough to treat the whole quad as one super-node.
		if width * width < THETA * THETA * l {
			if l < DISTANCE_MAX * DISTANCE_MAX && l > 0.0 {
				let f = self.charge * alpha / l;
				*fx += dx * f;
				*fy += dy * f;
			}
			return;
		}

		match &self.body {
			CellBody::Leaf(bodies) => {
				for b in bodies {
					if b.index == skip {
						continue;
					}
					let mut dx = b.x - x;
					let mut dy = b.y - y;
					let mut l = dx * dx + dy * dy;
					if l >= DISTANCE_MAX * DISTANCE_MAX {
						continue;
					}
					if l == 0.0 {
						dx = 1e-6;
						dy = 0.0;
						l = dx * dx;
					}
					let f = b.charge * alpha / l;
					*fx += dx * f;
					*fy += dy * f;
				}
			}
			CellBody::Split(children) => {
				for child in children.iter().flatten() {
					child.accumulate(x, y, skip, alpha, fx, fy);
				}
			}
		}
	}
}

fn child_cell(cx: f64, cy: f64, half: f64, quadrant: usize) -> Cell {
	let q = half / 2.0;
	let ccx = if quadrant & 1 == 0 { cx - q } else { cx + q };
	let ccy = if quadrant & 2 == 0 { cy - q } else { cy + q };
	Cell::new(ccx, ccy, q)
}

struct QuadTree {
	root: Cell,
}

impl QuadTree {
	fn build(nodes: &[SimNode]) -> Option<Self> {
		let first = nodes.first()?;
		let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
		for n in nodes {
			min_x = min_x.min(n.x);
			max_x = max_x.max(n.x);
			min_y = min_y.min(n.y);
			max_y = max_y.max(n.y);
		}
		let half = ((max_x - min_x).max(max_y - min_y) / 2.0) + 1.0;
		let mut root = Cell::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0, half);
		for (index, n) in nodes.iter().enumerate() {
			root.insert(
				Body {
					index,
					x: n.x,
					y: n.y,
					charge: n.charge,
				},
				0,
			);
		}
		Some(Self { root })
	}

	fn force_at(&self, x: f64, y: f64, skip: usize, alpha: f64) -> (f64, f64) {
		let (mut fx, mut fy) = (0.0, 0.0);
		self.root.accumulate(x, y, skip, alpha, &mut fx, &mut fy);
		(fx, fy)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run_to_rest(sim: &mut ForceSimulation) -> usize {
		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
			assert!(ticks < 2000, "simulation failed to reach rest");
		}
		ticks
	}

	fn pair_distance(sim: &ForceSimulation, i: usize, j: usize) -> f64 {
		let (a, b) = (&sim.nodes()[i], &sim.nodes()[j]);
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn repulsion_pushes_neighbors_apart() {
		let tree = QuadTree::build(&[
			SimNode::new(0.0, 0.0, -200.0),
			SimNode::new(50.0, 0.0, -200.0),
		])
		.unwrap();
		let (fx, _) = tree.force_at(0.0, 0.0, 0, 1.0);
		assert!(fx < 0.0, "expected push away from the neighbor, got {fx}");
	}

	#[test]
	fn repulsion_ignores_interactions_beyond_max_distance() {
		let tree = QuadTree::build(&[
			SimNode::new(0.0, 0.0, -200.0),
			SimNode::new(500.0, 0.0, -200.0),
		])
		.unwrap();
		let (fx, fy) = tree.force_at(0.0, 0.0, 0, 1.0);
		assert_eq!((fx, fy), (0.0, 0.0));
	}

	#[test]
	fn simulation_reaches_rest() {
		let nodes = (0..6)
			.map(|i| SimNode::new((i as f64) * 30.0, (i as f64) * 17.0, -200.0))
			.collect();
		let edges = (0..5)
			.map(|i| SimEdge {
				source: i,
				target: i + 1,
				rest_length: 50.0,
			})
			.collect();
		let mut sim = ForceSimulation::new(nodes, edges, (200.0, 200.0));
		run_to_rest(&mut sim);
		assert!(!sim.active());
		assert!(sim.alpha() < ALPHA_MIN);
	}

	#[test]
	fn no_two_free_nodes_rest_closer_than_the_collision_separation() {
		// Start everything bunched together so the collision pass has
		// real work to do.
		let nodes = (0..5)
			.map(|i| SimNode::new(100.0 + i as f64, 100.0 + (i % 2) as f64, -200.0))
			.collect();
		let edges = vec![
			SimEdge {
				source: 0,
				target: 1,
				rest_length: 50.0,
			},
			SimEdge {
				source: 1,
				target: 2,
				rest_length: 50.0,
			},
			SimEdge {
				source: 2,
				target: 3,
				rest_length: 100.0,
			},
			SimEdge {
				source: 3,
				target: 4,
				rest_length: 100.0,
			},
		];
		let mut sim = ForceSimulation::new(nodes, edges, (150.0, 150.0));
		run_to_rest(&mut sim);

		let min_sep = 2.0 * COLLIDE_RADIUS;
		for i in 0..5 {
			for j in (i + 1)..5 {
				let d = pair_distance(&sim, i, j);
				assert!(
					d >= min_sep - 1.0,
					"nodes {i} and {j} rest {d:.1} apart, expected at least {min_sep}"
				);
			}
		}
	}

	#[test]
	fn pinned_node_does_not_drift_after_release() {
		let nodes = vec![
			SimNode::new(0.0, 0.0, -200.0),
			SimNode::new(60.0, 0.0, -200.0),
			SimNode::new(0.0, 60.0, -200.0),
		];
		let edges = vec![
			SimEdge {
				source: 0,
				target: 1,
				rest_length: 50.0,
			},
			SimEdge {
				source: 0,
				target: 2,
				rest_length: 100.0,
			},
		];
		let mut sim = ForceSimulation::new(nodes, edges, (300.0, 300.0));

		// Drag node 0 to (100, 200) and release: target bumped during the
		// drag, then dropped back to zero, node left pinned.
		sim.set_alpha_target(0.3);
		sim.restart();
		sim.pin(0, 100.0, 200.0);
		sim.set_alpha_target(0.0);

		for _ in 0..50 {
			sim.tick();
		}

		let dropped = &sim.nodes()[0];
		assert_eq!((dropped.x, dropped.y), (100.0, 200.0));
	}

	#[test]
	fn spring_settles_linked_pair_near_rest_length() {
		let nodes = vec![
			SimNode::new(0.0, 0.0, -200.0),
			SimNode::new(300.0, 0.0, -200.0),
		];
		let edges = vec![SimEdge {
			source: 0,
			target: 1,
			rest_length: 100.0,
		}];
		let mut sim = ForceSimulation::new(nodes, edges, (150.0, 0.0));
		run_to_rest(&mut sim);

		let d = pair_distance(&sim, 0, 1);
		assert!(d < 300.0, "spring never pulled the pair together: {d:.1}");
		assert!(d >= 2.0 * COLLIDE_RADIUS - 1.0);
	}
}
