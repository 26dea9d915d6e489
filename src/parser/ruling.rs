//! Table finding from ruling lines (lattice mode).
//!
//! Painted segments are reduced to horizontal and vertical edges, nearby
//! edges are snapped and joined, and their crossings become grid points.
//! The smallest rectangles whose corners are connected grid points are
//! cells; cells sharing a corner form one table. Cell text is every span
//! whose centre falls inside the cell.

use std::collections::HashMap;

use crate::model::{Cell, Row, Table};

use super::content::Segment;
use super::layout::{spans_to_text, TextSpan};
use super::options::TableSettings;

/// Segments whose ends differ by at most this much across the axis count as
/// axis-aligned.
const AXIS_EPSILON: f32 = 0.5;

/// Edge direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned ruling edge.
///
/// For horizontal edges `pos` is the Y coordinate and `start..end` spans X;
/// for vertical edges `pos` is X and `start..end` spans Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub orientation: Orientation,
    pub pos: f32,
    pub start: f32,
    pub end: f32,
}

impl Edge {
    pub fn horizontal(y: f32, x0: f32, x1: f32) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            pos: y,
            start: x0.min(x1),
            end: x0.max(x1),
        }
    }

    pub fn vertical(x: f32, y0: f32, y1: f32) -> Self {
        Self {
            orientation: Orientation::Vertical,
            pos: x,
            start: y0.min(y1),
            end: y0.max(y1),
        }
    }

    pub fn length(&self) -> f32 {
        self.end - self.start
    }
}

/// A table cell's bounds in user space (`y0` bottom, `y1` top).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl CellBox {
    /// Inclusive point containment.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    fn corners(&self) -> [Key; 4] {
        [
            key(self.x0, self.y0),
            key(self.x0, self.y1),
            key(self.x1, self.y0),
            key(self.x1, self.y1),
        ]
    }
}

/// Exact coordinate key; snapped positions compare bit-for-bit.
type Key = (u32, u32);

fn key(x: f32, y: f32) -> Key {
    (x.to_bits(), y.to_bits())
}

/// A grid point and the edges crossing there.
#[derive(Debug, Clone)]
struct Intersection {
    x: f32,
    y: f32,
    h: Vec<usize>,
    v: Vec<usize>,
}

fn shares(a: &[usize], b: &[usize]) -> bool {
    a.iter().any(|i| b.contains(i))
}

/// Keep the axis-aligned segments as edges.
pub fn edges_from_segments(segments: &[Segment]) -> Vec<Edge> {
    segments
        .iter()
        .filter_map(|s| {
            let dx = (s.x1 - s.x0).abs();
            let dy = (s.y1 - s.y0).abs();
            if dy <= AXIS_EPSILON && dx > dy {
                Some(Edge::horizontal((s.y0 + s.y1) / 2.0, s.x0, s.x1))
            } else if dx <= AXIS_EPSILON && dy > dx {
                Some(Edge::vertical((s.x0 + s.x1) / 2.0, s.y0, s.y1))
            } else {
                None
            }
        })
        .collect()
}

/// Move parallel edges within `tolerance` of each other onto their mean position.
pub fn snap_edges(mut edges: Vec<Edge>, tolerance: f32) -> Vec<Edge> {
    edges.sort_by(|a, b| {
        a.orientation
            .cmp(&b.orientation)
            .then(a.pos.total_cmp(&b.pos))
    });

    let mut start = 0;
    while start < edges.len() {
        let mut end = start + 1;
        while end < edges.len()
            && edges[end].orientation == edges[start].orientation
            && edges[end].pos - edges[end - 1].pos <= tolerance
        {
            end += 1;
        }

        let cluster = &mut edges[start..end];
        let mean = cluster.iter().map(|e| e.pos).sum::<f32>() / cluster.len() as f32;
        for edge in cluster.iter_mut() {
            edge.pos = mean;
        }
        start = end;
    }

    edges
}

/// Merge collinear edges that overlap or sit within `tolerance` of each other.
pub fn join_edges(mut edges: Vec<Edge>, tolerance: f32) -> Vec<Edge> {
    edges.sort_by(|a, b| {
        a.orientation
            .cmp(&b.orientation)
            .then(a.pos.total_cmp(&b.pos))
            .then(a.start.total_cmp(&b.start))
    });

    let mut joined: Vec<Edge> = Vec::with_capacity(edges.len());
    for edge in edges {
        match joined.last_mut() {
            Some(last)
                if last.orientation == edge.orientation
                    && last.pos == edge.pos
                    && edge.start <= last.end + tolerance =>
            {
                last.end = last.end.max(edge.end);
            }
            _ => joined.push(edge),
        }
    }
    joined
}

/// Finds ruled tables on a page.
pub struct RulingTableFinder {
    settings: TableSettings,
}

impl RulingTableFinder {
    /// Create a finder with the given settings.
    pub fn new(settings: TableSettings) -> Self {
        Self { settings }
    }

    /// Normalize raw segments into snapped, joined, length-filtered edges.
    pub fn edges(&self, segments: &[Segment]) -> Vec<Edge> {
        let edges = edges_from_segments(segments);
        let edges = snap_edges(edges, self.settings.snap_tolerance);
        let edges = join_edges(edges, self.settings.join_tolerance);
        edges
            .into_iter()
            .filter(|e| e.length() >= self.settings.edge_min_length)
            .collect()
    }

    /// Find ruled grids, each a list of cells, ordered top to bottom then
    /// left to right.
    pub fn find_grids(&self, segments: &[Segment]) -> Vec<Vec<CellBox>> {
        let edges = self.edges(segments);
        let points = self.intersections(&edges);
        let cells = find_cells(&points);
        log::debug!(
            "ruling: {} edges, {} intersections, {} cells",
            edges.len(),
            points.len(),
            cells.len()
        );

        let mut grids: Vec<Vec<CellBox>> = group_cells(cells)
            .into_iter()
            .filter(|g| g.len() >= self.settings.min_cells)
            .collect();

        grids.sort_by(|a, b| {
            let (top_a, left_a) = grid_origin(a);
            let (top_b, left_b) = grid_origin(b);
            top_b.total_cmp(&top_a).then(left_a.total_cmp(&left_b))
        });
        grids
    }

    /// Find ruled tables and fill their cells from the page's spans.
    pub fn extract(&self, segments: &[Segment], spans: &[TextSpan]) -> Vec<Table> {
        self.find_grids(segments)
            .iter()
            .map(|grid| grid_to_table(grid, spans))
            .collect()
    }

    fn intersections(&self, edges: &[Edge]) -> Vec<Intersection> {
        let tol = self.settings.intersection_tolerance;
        let mut points: Vec<Intersection> = Vec::new();
        let mut index: HashMap<Key, usize> = HashMap::new();

        for (vi, v) in edges.iter().enumerate() {
            if v.orientation != Orientation::Vertical {
                continue;
            }
            for (hi, h) in edges.iter().enumerate() {
                if h.orientation != Orientation::Horizontal {
                    continue;
                }
                let crosses = v.start - tol <= h.pos
                    && h.pos <= v.end + tol
                    && h.start - tol <= v.pos
                    && v.pos <= h.end + tol;
                if !crosses {
                    continue;
                }

                let slot = *index.entry(key(v.pos, h.pos)).or_insert_with(|| {
                    points.push(Intersection {
                        x: v.pos,
                        y: h.pos,
                        h: Vec::new(),
                        v: Vec::new(),
                    });
                    points.len() - 1
                });
                let point = &mut points[slot];
                if !point.h.contains(&hi) {
                    point.h.push(hi);
                }
                if !point.v.contains(&vi) {
                    point.v.push(vi);
                }
            }
        }

        points
    }
}

impl Default for RulingTableFinder {
    fn default() -> Self {
        Self::new(TableSettings::default())
    }
}

/// Build the smallest connected cell below-right of every grid point.
fn find_cells(points: &[Intersection]) -> Vec<CellBox> {
    let index: HashMap<Key, usize> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (key(p.x, p.y), i))
        .collect();

    // Points sharing an X (top to bottom) and sharing a Y (left to right).
    let mut columns: HashMap<u32, Vec<usize>> = HashMap::new();
    let mut rows: HashMap<u32, Vec<usize>> = HashMap::new();
    for (i, p) in points.iter().enumerate() {
        columns.entry(p.x.to_bits()).or_default().push(i);
        rows.entry(p.y.to_bits()).or_default().push(i);
    }
    for col in columns.values_mut() {
        col.sort_by(|&a, &b| points[b].y.total_cmp(&points[a].y));
    }
    for row in rows.values_mut() {
        row.sort_by(|&a, &b| points[a].x.total_cmp(&points[b].x));
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[b]
            .y
            .total_cmp(&points[a].y)
            .then(points[a].x.total_cmp(&points[b].x))
    });

    let mut cells = Vec::new();
    for &i in &order {
        let p = &points[i];
        let below = columns[&p.x.to_bits()]
            .iter()
            .map(|&j| &points[j])
            .filter(|q| q.y < p.y);

        'search: for b in below {
            if !shares(&p.v, &b.v) {
                continue;
            }
            let right = rows[&p.y.to_bits()]
                .iter()
                .map(|&j| &points[j])
                .filter(|q| q.x > p.x);
            for r in right {
                if !shares(&p.h, &r.h) {
                    continue;
                }
                let Some(&c) = index.get(&key(r.x, b.y)) else {
                    continue;
                };
                let corner = &points[c];
                if shares(&corner.h, &b.h) && shares(&corner.v, &r.v) {
                    cells.push(CellBox {
                        x0: p.x,
                        y0: b.y,
                        x1: r.x,
                        y1: p.y,
                    });
                    break 'search;
                }
            }
        }
    }

    cells
}

/// Group cells that share a corner, keeping discovery order within groups.
fn group_cells(cells: Vec<CellBox>) -> Vec<Vec<CellBox>> {
    let mut parent: Vec<usize> = (0..cells.len()).collect();

    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let mut owner: HashMap<Key, usize> = HashMap::new();
    for (i, cell) in cells.iter().enumerate() {
        for corner in cell.corners() {
            match owner.get(&corner) {
                Some(&j) => {
                    let (a, b) = (root(&mut parent, i), root(&mut parent, j));
                    if a != b {
                        parent[a.max(b)] = a.min(b);
                    }
                }
                None => {
                    owner.insert(corner, i);
                }
            }
        }
    }

    let mut groups: Vec<Vec<CellBox>> = Vec::new();
    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    for (i, cell) in cells.into_iter().enumerate() {
        let r = root(&mut parent, i);
        let slot = *slot_of_root.entry(r).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(cell);
    }
    groups
}

/// Top edge and left edge of a grid.
fn grid_origin(cells: &[CellBox]) -> (f32, f32) {
    let top = cells.iter().map(|c| c.y1).fold(f32::MIN, f32::max);
    let left = cells.iter().map(|c| c.x0).fold(f32::MAX, f32::min);
    (top, left)
}

fn distinct_sorted(mut values: Vec<f32>, descending: bool) -> Vec<f32> {
    values.sort_by(|a, b| if descending { b.total_cmp(a) } else { a.total_cmp(b) });
    values.dedup_by(|a, b| a.to_bits() == b.to_bits());
    values
}

/// Lay a grid out as rows (by cell top) and columns (by cell left).
///
/// Positions with no cell, such as those covered by a merged cell, are `None`.
fn grid_to_table(cells: &[CellBox], spans: &[TextSpan]) -> Table {
    let tops = distinct_sorted(cells.iter().map(|c| c.y1).collect(), true);
    let lefts = distinct_sorted(cells.iter().map(|c| c.x0).collect(), false);

    let rows = tops.iter().map(|&top| {
        let row_cells: Vec<&CellBox> = cells.iter().filter(|c| c.y1 == top).collect();
        Row::from_cells(lefts.iter().map(|&left| {
            row_cells
                .iter()
                .find(|c| c.x0 == left)
                .and_then(|c| cell_text(c, spans))
        }))
    });

    Table {
        rows: rows.collect(),
    }
}

/// Text of the glyphs centred inside a cell, `None` when there is none.
///
/// A span crossing cell edges contributes only the glyphs on this side.
fn cell_text(cell: &CellBox, spans: &[TextSpan]) -> Cell {
    let inside: Vec<TextSpan> = spans
        .iter()
        .flat_map(|s| {
            let (_, cy) = s.center();
            s.pieces_where(|cx| cell.contains(cx, cy))
        })
        .collect();

    let text = spans_to_text(inside);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
