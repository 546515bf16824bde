//! Compact warehouse layout and initial stock.
//!
//! # Grid
//!
//! ```text
//!   LS ┐                                             ┌ WS
//!      │ col 0   1   2 … (storage) …   c-2   c-1     │
//!      └─▶ ○ ─ ○ ─ ○ ─ ○ ─ ○ ─ ○ ─ ○ ─ ○ ─ ○ ◀──────┘
//! ```
//!
//! Letter stations are spread down the left edge and word stations down
//! the right edge.  Between them sits a grid of square blocks, each
//! `2·tote_radius + 2·tolerance` wide, with a waypoint at every block centre.
//!
//! - Rows with `i % 10` in `{0, 4}` run west only and rows in `{1, 7}` east
//!   only; the rest are two-way and hold the storage slots.
//! - A two-way row's block is a slot unless it is in one of the two outer
//!   columns on either side or in every fifth column, which stay open as
//!   cross aisles.
//! - Columns `0` and `c-2` carry traffic toward higher rows, `1` and `c-1`
//!   toward lower rows.  Inner columns run toward lower rows when
//!   `j % 10 == 0`, toward higher rows when `j % 10 == 5`, else both ways.
//! - Each station gets a three-waypoint queue (approach, station, exit)
//!   tied to the closest waypoints of the nearest grid column.
//!
//! Totes start on the first `num_totes` slots in id order.  Robots are
//! dropped at random clear spots.

use fl_core::{Circle, LetterStationId, RobotId, SimConfig, SimRng, ToteId, Vec2, WaypointId, WordStationId};
use fl_graph::{WaypointGraph, WaypointGraphBuilder, WaypointKind};
use fl_robot::{Robot, RobotStore};
use fl_spatial::Floor;
use fl_stock::{LetterStation, TileMint, Tote, ToteStore, WordStation};

use crate::content::ContentSource;
use crate::{SimError, SimResult};

/// Random draws per robot before placement gives up.
const PLACEMENT_ATTEMPTS: usize = 10_000;

/// Storage columns between cross aisles.  Lane directions repeat every
/// two spans.
const BLOCK_SPAN: usize = 5;

/// Station queue waypoints sit this many station radii above and below.
const QUEUE_OFFSET_RADII: f32 = 2.5;

/// Everything positional the builder needs, freshly placed.
pub struct Layout {
    pub floor: Floor,
    pub graph: WaypointGraph,
    pub totes: ToteStore,
    pub robots: RobotStore,
    pub letter_stations: Vec<LetterStation>,
    pub word_stations: Vec<WordStation>,
    /// Grid rows.  Grid waypoint `(i, j)` has id `i * cols + j`.
    pub rows: usize,
    pub cols: usize,
}

impl Layout {
    /// Waypoint id of grid cell `(row, col)`.
    pub fn grid_waypoint(&self, row: usize, col: usize) -> Option<WaypointId> {
        (row < self.rows && col < self.cols).then(|| WaypointId((row * self.cols + col) as u32))
    }
}

/// Build the compact layout for `cfg`.
pub fn compact(cfg: &SimConfig, rng: &mut SimRng) -> SimResult<Layout> {
    let (w, h, tol) = (cfg.arena.width, cfg.arena.height, cfg.arena.tolerance);
    let robot_r = cfg.fleet.radius;
    let station_r = cfg.stations.radius;
    let tuning = &cfg.tuning;

    let mut floor = Floor::new(w, h, tol, tuning.quadtree_division_threshold, tuning.quadtree_combine_threshold);
    let mut obstacles: Vec<Circle> = Vec::new();

    // ── Stations ──────────────────────────────────────────────────────────
    let edge = station_r.max(robot_r);
    let n_ls = cfg.stations.num_letter_stations;
    let n_ws = cfg.stations.num_word_stations;
    let mut letter_stations = Vec::with_capacity(n_ls);
    for i in 0..n_ls {
        let body = Circle::new(edge, (i + 1) as f32 * h / (n_ls + 1) as f32, station_r);
        floor.add_station(body);
        obstacles.push(body);
        letter_stations.push(LetterStation::new(LetterStationId(i as u32), body, &cfg.stations));
    }
    let mut word_stations = Vec::with_capacity(n_ws);
    for i in 0..n_ws {
        let body = Circle::new(w - edge, (i + 1) as f32 * h / (n_ws + 1) as f32, station_r);
        floor.add_station(body);
        obstacles.push(body);
        word_stations.push(WordStation::new(WordStationId(i as u32), body, &cfg.stations));
    }

    // ── Grid ──────────────────────────────────────────────────────────────
    let placeable_w = w - 2.0 * station_r - 8.0 * robot_r;
    let placeable_h = h - 2.0 * robot_r;
    let block = 2.0 * cfg.totes.radius + 2.0 * tol;
    if placeable_w <= 0.0 || placeable_h <= 0.0 {
        return Err(SimError::Layout(format!("a {w} x {h} arena leaves no room for storage")));
    }
    let cols = (placeable_w / block) as usize;
    let rows = (placeable_h / block) as usize;
    if cols < 2 || rows < 1 {
        return Err(SimError::Layout(format!("storage grid of {rows} x {cols} blocks is too small")));
    }
    let x0 = (w - placeable_w + block) / 2.0;
    let y0 = (h - placeable_h + block) / 2.0;

    let mut b = WaypointGraphBuilder::new();
    for i in 0..rows {
        for j in 0..cols {
            let kind = if is_storage(i, j, cols) { WaypointKind::StorageSlot } else { WaypointKind::Transit };
            b.add_waypoint(Vec2::new(x0 + j as f32 * block, y0 + i as f32 * block), kind);
        }
    }
    let at = |i: usize, j: usize| WaypointId((i * cols + j) as u32);
    for i in 0..rows {
        for j in 0..cols {
            if j > 0 {
                match i % (2 * BLOCK_SPAN) {
                    0 | 4 => b.add_path(at(i, j), at(i, j - 1)),
                    1 | 7 => b.add_path(at(i, j - 1), at(i, j)),
                    _ => b.add_bidirectional(at(i, j), at(i, j - 1)),
                }
            }
            if i > 0 {
                let (up, down) = (at(i - 1, j), at(i, j));
                if j == 0 || j == cols - 2 {
                    b.add_path(up, down);
                } else if j == 1 || j == cols - 1 {
                    b.add_path(down, up);
                } else {
                    match j % (2 * BLOCK_SPAN) {
                        0 => b.add_path(down, up),
                        BLOCK_SPAN => b.add_path(up, down),
                        _ => b.add_bidirectional(down, up),
                    }
                }
            }
        }
    }

    // ── Station queues ────────────────────────────────────────────────────
    let left: Vec<_> = (0..rows).map(|i| at(i, 0)).collect();
    let right: Vec<_> = (0..rows).map(|i| at(i, cols - 1)).collect();
    for st in &letter_stations {
        let c = st.body.center;
        let offset = QUEUE_OFFSET_RADII * st.body.radius;
        let approach = Vec2::new(c.x, c.y - offset);
        let exit = Vec2::new(c.x, c.y + offset);
        add_queue(&mut b, &left, approach, c, exit, WaypointKind::LetterStation(st.id));
    }
    for st in &word_stations {
        let c = st.body.center;
        let offset = QUEUE_OFFSET_RADII * st.body.radius;
        let approach = Vec2::new(c.x, c.y + offset);
        let exit = Vec2::new(c.x, c.y - offset);
        add_queue(&mut b, &right, approach, c, exit, WaypointKind::WordStation(st.id));
    }
    let mut graph = b.build()?;

    // ── Totes ─────────────────────────────────────────────────────────────
    let slots: Vec<_> = graph.storage_slots().collect();
    let n_totes = cfg.totes.num_totes;
    if slots.len() < n_totes {
        return Err(SimError::Layout(format!("{} storage slots for {n_totes} totes", slots.len())));
    }
    if slots.len() == n_totes {
        log::warn!("every storage slot starts occupied; totes can only trade places");
    }
    let mut totes = ToteStore::new();
    for (i, &slot) in slots.iter().take(n_totes).enumerate() {
        let id = ToteId(i as u32);
        let pos = graph.position(slot);
        let body = Circle::new(pos.x, pos.y, cfg.totes.radius);
        floor.add_tote(id, body)?;
        graph.tote_set_down(id, slot)?;
        totes.push(Tote::new(id, cfg.totes.capacity, slot))?;
        obstacles.push(body);
    }

    // ── Robots ────────────────────────────────────────────────────────────
    let mut robots = RobotStore::new();
    for i in 0..cfg.fleet.num_robots {
        let id = RobotId(i as u32);
        let body = place_robot(&obstacles, w, h, robot_r, rng)
            .ok_or_else(|| SimError::Layout(format!("no clear spot for {id} after {PLACEMENT_ATTEMPTS} tries")))?;
        floor.add_robot(id, body)?;
        robots.push(Robot::new(id, body.center, &cfg.fleet));
        obstacles.push(body);
    }

    log::info!(
        "layout: {rows} x {cols} grid, {} storage slots, {} waypoints, {} stations, {} totes, {} robots",
        slots.len(),
        graph.node_count(),
        floor.stations().len(),
        totes.len(),
        robots.len()
    );
    Ok(Layout { floor, graph, totes, robots, letter_stations, word_stations, rows, cols })
}

fn is_storage(i: usize, j: usize, cols: usize) -> bool {
    let two_way = !matches!(i % (2 * BLOCK_SPAN), 0 | 1 | 4 | 7);
    two_way && j > 1 && j + 2 < cols && j % BLOCK_SPAN != 0
}

/// Approach → station → exit, entered from and left to the closest waypoint
/// of `column`.
fn add_queue(
    b: &mut WaypointGraphBuilder,
    column: &[WaypointId],
    approach: Vec2,
    center: Vec2,
    exit: Vec2,
    kind: WaypointKind,
) {
    let closest = |b: &WaypointGraphBuilder, p: Vec2| {
        column.iter().copied().min_by(|x, y| b.position(*x).distance(p).total_cmp(&b.position(*y).distance(p)))
    };
    let entry = closest(b, approach);
    let leave = closest(b, exit);
    let wa = b.add_waypoint(approach, WaypointKind::Transit);
    let wb = b.add_waypoint(center, kind);
    let wc = b.add_waypoint(exit, WaypointKind::Transit);
    if let Some(entry) = entry {
        b.add_path(entry, wa);
    }
    b.add_path(wa, wb);
    b.add_path(wb, wc);
    if let Some(leave) = leave {
        b.add_path(wc, leave);
    }
}

fn place_robot(obstacles: &[Circle], w: f32, h: f32, r: f32, rng: &mut SimRng) -> Option<Circle> {
    (0..PLACEMENT_ATTEMPTS).find_map(|_| {
        let x = rng.random::<f32>() * (w - 2.0 * r) + r;
        let y = rng.random::<f32>() * (h - 2.0 * r) + r;
        obstacles.iter().all(|c| !c.collides_at(x, y, r)).then(|| Circle::new(x, y, r))
    })
}

// ── Initial stock ─────────────────────────────────────────────────────────────

/// Fill totes with `round(fraction · totes · capacity / bundle)` bundles of
/// random letters.  Returns the number of bundles placed.
pub fn stock_initial_inventory(
    cfg: &SimConfig,
    totes: &mut ToteStore,
    mint: &mut TileMint,
    content: &mut dyn ContentSource,
    rng: &mut SimRng,
) -> usize {
    let bundle = cfg.stations.bundle_size;
    let capacity: usize = totes.iter().map(|t| t.capacity).sum();
    let target = (cfg.totes.initial_inventory as f64 * capacity as f64 / bundle as f64).round() as usize;

    let mut placed = 0;
    while placed < target {
        let open: Vec<ToteId> = totes.iter().filter(|t| t.has_room_for(bundle)).map(|t| t.id).collect();
        let Some(&id) = rng.choose(&open) else {
            log::warn!("initial inventory stopped at {placed} of {target} bundles: no tote has room");
            break;
        };
        let letter = content.random_letter(rng);
        let Some(tote) = totes.get_mut(id) else { break };
        if tote.add_tiles(mint.mint_bundle(letter, bundle)).is_err() {
            break;
        }
        placed += 1;
    }
    placed
}
