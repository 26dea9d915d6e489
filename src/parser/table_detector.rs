//! Table detection from text alignment (stream mode).
//!
//! Used when a page draws no ruling lines. Rows are baselines, columns are
//! left edges that recur across rows; runs of aligned rows become tables.

use std::collections::{HashMap, HashSet};

use crate::model::{Row, Table};

use super::layout::TextSpan;

/// Left edges within this many points share a bucket.
const BUCKET_SIZE: f32 = 5.0;

/// Slack (points) when testing whether a span starts at a column edge.
const ALIGN_TOLERANCE: f32 = 5.0;

/// A detected table region with its content.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Baseline of the first row
    pub top_y: f32,
    /// Baseline of the last row
    pub bottom_y: f32,
    pub left_x: f32,
    pub right_x: f32,
    /// Column left edges, ascending
    pub columns: Vec<f32>,
    /// Rows top to bottom
    pub rows: Vec<DetectedRow>,
}

/// Spans sharing a baseline inside a detected table.
#[derive(Debug, Clone)]
pub struct DetectedRow {
    /// Mean baseline of the row
    pub y: f32,
    /// Spans sorted by X
    pub spans: Vec<TextSpan>,
}

/// Baseline group referring back into the page's span list.
#[derive(Debug, Clone)]
struct SpanRow {
    y: f32,
    members: Vec<usize>,
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Detects tables in a list of text spans.
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self {
            config: TableDetectorConfig::default(),
        }
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables and convert them to the output model.
    pub fn extract(&self, spans: &[TextSpan]) -> Vec<Table> {
        self.detect(spans).iter().map(to_table).collect()
    }

    /// Detect table regions in the given spans, top to bottom.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        let min_spans = self.config.min_rows * self.config.min_columns;
        if spans.len() < min_spans {
            log::debug!(
                "TableDetector: not enough spans ({} < {})",
                spans.len(),
                min_spans
            );
            return Vec::new();
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            log::debug!("TableDetector: only {} rows", rows.len());
            return Vec::new();
        }

        let columns = self.detect_columns(spans, &rows);
        if columns.len() < self.config.min_columns {
            log::debug!("TableDetector: only {} page-wide columns", columns.len());
            return Vec::new();
        }

        let regions = self.find_table_regions(spans, &rows, &columns);
        log::debug!("TableDetector: {} candidate regions", regions.len());

        let mut detected = Vec::new();
        for (start, end) in regions {
            let region = &rows[start..=end];

            // Columns are re-derived per region; page-wide ones mix tables.
            let region_columns = self.detect_columns(spans, region);
            if region_columns.len() < self.config.min_columns {
                continue;
            }
            if region_columns.len() > self.config.max_columns {
                log::debug!(
                    "TableDetector: skipping region with {} columns (max {})",
                    region_columns.len(),
                    self.config.max_columns
                );
                continue;
            }
            if self.is_list_pattern(spans, region, &region_columns) {
                log::debug!("TableDetector: skipping list-like region");
                continue;
            }

            detected.push(build_detected(spans, region, region_columns));
        }

        detected
    }

    /// Group span indices into rows by baseline, top to bottom.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<SpanRow> {
        let mut order: Vec<usize> = (0..spans.len()).collect();
        order.sort_by(|&a, &b| {
            spans[b]
                .y
                .total_cmp(&spans[a].y)
                .then(spans[a].x.total_cmp(&spans[b].x))
        });

        let mut rows: Vec<SpanRow> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut current_y: Option<f32> = None;

        for idx in order {
            let span = &spans[idx];
            let y_tolerance = span.font_size * self.config.y_tolerance_factor;
            match current_y {
                Some(y) if (span.y - y).abs() <= y_tolerance => current.push(idx),
                _ => {
                    if !current.is_empty() {
                        rows.push(finish_row(spans, std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(idx);
                }
            }
        }
        if !current.is_empty() {
            rows.push(finish_row(spans, current));
        }

        rows
    }

    /// Left edges that recur across rows.
    ///
    /// Rows with two or more spans are the likeliest table rows, so they are
    /// counted alone when there are enough of them. Each bucket counts once
    /// per row in that case.
    fn detect_columns(&self, spans: &[TextSpan], rows: &[SpanRow]) -> Vec<f32> {
        let multi: Vec<&SpanRow> = rows.iter().filter(|r| r.members.len() >= 2).collect();

        let mut counts: HashMap<i32, usize> = HashMap::new();
        let considered = if multi.len() >= self.config.min_rows {
            for row in &multi {
                let buckets: HashSet<i32> =
                    row.members.iter().map(|&i| bucket_of(spans[i].x)).collect();
                for bucket in buckets {
                    *counts.entry(bucket).or_insert(0) += 1;
                }
            }
            multi.len()
        } else {
            for row in rows {
                for &i in &row.members {
                    *counts.entry(bucket_of(spans[i].x)).or_insert(0) += 1;
                }
            }
            rows.len()
        };

        let min_occurrences =
            ((considered as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<f32> = counts
            .into_iter()
            .filter(|&(_, count)| count >= min_occurrences)
            .map(|(bucket, _)| bucket as f32 * BUCKET_SIZE)
            .collect();
        edges.sort_by(f32::total_cmp);

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Contiguous runs of well-aligned rows, as inclusive index ranges.
    fn find_table_regions(
        &self,
        spans: &[TextSpan],
        rows: &[SpanRow],
        columns: &[f32],
    ) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(spans, row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
                continue;
            }
            if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }

    /// Whether the region is a bulleted or numbered list rather than a table.
    ///
    /// A list marker and its item text often land in separate spans, which
    /// looks like two aligned columns.
    fn is_list_pattern(&self, spans: &[TextSpan], rows: &[SpanRow], columns: &[f32]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullets = 0;
        let mut numbers = 0;
        for row in rows {
            let Some(&first) = row.members.first() else {
                continue;
            };
            let text = spans[first].text.trim();
            if is_bullet_marker(text) {
                bullets += 1;
            } else if is_number_marker(text) {
                numbers += 1;
            }
        }

        let bullet_ratio = bullets as f32 / rows.len() as f32;
        let marker_ratio = (bullets + numbers) as f32 / rows.len() as f32;

        // Numbered first columns are common in real tables; only two-column
        // regions are rejected for them.
        bullet_ratio >= 0.5 || (columns.len() == 2 && marker_ratio >= 0.5)
    }
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn bucket_of(x: f32) -> i32 {
    (x / BUCKET_SIZE).round() as i32
}

/// Members sorted by X, baseline averaged.
fn finish_row(spans: &[TextSpan], mut members: Vec<usize>) -> SpanRow {
    members.sort_by(|&a, &b| spans[a].x.total_cmp(&spans[b].x));
    let y = members.iter().map(|&i| spans[i].y).sum::<f32>() / members.len() as f32;
    SpanRow { y, members }
}

/// Fraction of a row's spans that start at a column edge.
fn alignment_score(spans: &[TextSpan], row: &SpanRow, columns: &[f32]) -> f32 {
    if row.members.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .members
        .iter()
        .filter(|&&i| columns.iter().any(|c| (spans[i].x - c).abs() <= ALIGN_TOLERANCE))
        .count();
    aligned as f32 / row.members.len() as f32
}

fn build_detected(spans: &[TextSpan], region: &[SpanRow], columns: Vec<f32>) -> DetectedTable {
    let members = || region.iter().flat_map(|r| r.members.iter().map(|&i| &spans[i]));
    let left_x = members().map(|s| s.x).fold(f32::MAX, f32::min);
    let right_x = members().map(TextSpan::right).fold(f32::MIN, f32::max);

    DetectedTable {
        top_y: region.first().map_or(0.0, |r| r.y),
        bottom_y: region.last().map_or(0.0, |r| r.y),
        left_x,
        right_x,
        columns,
        rows: region
            .iter()
            .map(|r| DetectedRow {
                y: r.y,
                spans: r.members.iter().map(|&i| spans[i].clone()).collect(),
            })
            .collect(),
    }
}

/// Lay a detected table out as rows of cells.
///
/// Each span goes to one column; a column that receives nothing is `None`.
pub fn to_table(detected: &DetectedTable) -> Table {
    let columns = &detected.columns;
    let mut table = Table::new();
    if columns.is_empty() {
        return table;
    }

    for row in &detected.rows {
        let mut parts: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
        for span in &row.spans {
            let col = column_for(span.x, columns, detected.right_x);
            let text = span.text.trim();
            if !text.is_empty() {
                parts[col].push(text);
            }
        }
        table.add_row(Row::from_cells(
            parts
                .into_iter()
                .map(|p| (!p.is_empty()).then(|| p.join(" "))),
        ));
    }

    table
}

/// Column index for a span starting at `x`.
///
/// A span may start up to 10pt before its column edge. Spans outside every
/// column fall to the nearest edge.
fn column_for(x: f32, columns: &[f32], right_x: f32) -> usize {
    for (i, &start) in columns.iter().enumerate() {
        let end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if x >= start - 10.0 && x < end - 10.0 {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (x - **a).abs().total_cmp(&(x - **b).abs()))
        .map_or(0, |(i, _)| i)
}

/// Check if text is a bullet marker (•, -, etc.).
fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–"
            | "—"
            | "•"
            | "·"
            | "*"
            | "○"
            | "▪"
            | "◦"
            | "▸"
            | "▹"
            | "►"
            | "■"
            | "●"
            | "※"
            | "□"
            | "◆"
            | "◇"
            | "▶"
            | "▷"
            | "☞"
            | "➤"
            | "➜"
    )
}

/// Check if text is a number-style list marker (1., 2), a., etc.).
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let (digits, rest) = cleaned.split_at(pos);
        if !digits.is_empty() && (rest == "." || rest == ")") {
            return true;
        }
    }

    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some('.' | ')'), None) if letter.is_alphabetic()
    )
}
