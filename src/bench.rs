//! Scroll snappiness benchmark.
//!
//! Simulates a user scrolling through a large, fully loaded table and times
//! each render pass. Reports frame percentiles and how many frames would have
//! missed a 60 Hz or 30 Hz budget.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::config::TableConfig;
use crate::models::mock;
use crate::table::{ColumnKey, ColumnModel, PhotoTable, Viewport};

#[derive(Debug, Clone)]
pub struct BenchmarkArgs {
    pub rows: usize,
    pub frames: usize,
    pub viewport_height: f64,
    pub container_width: f32,
    pub config: TableConfig,
    /// Toggle sorting on this column halfway through.
    pub sort_column: Option<ColumnKey>,
}

impl Default for BenchmarkArgs {
    fn default() -> Self {
        Self {
            rows: 100_000,
            frames: 600,
            viewport_height: 800.0,
            container_width: 1430.0,
            config: TableConfig::default(),
            sort_column: Some(ColumnKey::TakenDate),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub rows: usize,
    pub frames_simulated: usize,
    pub total_ms: f64,
    pub sort_ms: Option<f64>,
    pub frame_avg_ms: f64,
    pub frame_p50_ms: f64,
    pub frame_p95_ms: f64,
    pub frames_over_16ms: usize,
    pub frames_over_33ms: usize,
    pub max_rows_materialized: usize,
}

impl BenchmarkReport {
    pub fn summary(&self) -> String {
        let sort = self
            .sort_ms
            .map(|ms| format!(" sort={ms:.3}ms"))
            .unwrap_or_default();
        format!(
            "rows={} frames={} total={:.1}ms avg={:.3}ms p50={:.3}ms p95={:.3}ms over16={} over33={} max_rows={}{}",
            self.rows,
            self.frames_simulated,
            self.total_ms,
            self.frame_avg_ms,
            self.frame_p50_ms,
            self.frame_p95_ms,
            self.frames_over_16ms,
            self.frames_over_33ms,
            self.max_rows_materialized,
            sort,
        )
    }
}

pub fn run_benchmark(args: &BenchmarkArgs) -> Result<BenchmarkReport> {
    if args.rows == 0 || args.frames == 0 {
        bail!("benchmark needs at least one row and one frame");
    }

    let photos = mock::catalog(args.rows);
    let mut table = PhotoTable::new(
        ColumnModel::photo_default(),
        args.config.clone(),
        photos.len(),
        false,
    );
    table.set_viewport(Viewport::new(0.0, args.viewport_height));
    table.set_container_width(args.container_width);

    let start = Instant::now();
    table.render_pass(&photos);

    let content_height = table.window(photos.len()).total_height;
    let step = content_height / args.frames as f64;
    let mut frame_times_ms = Vec::with_capacity(args.frames);
    let mut max_rows = 0usize;
    let mut sort_ms = None;

    for frame in 0..args.frames {
        if frame == args.frames / 2 {
            if let Some(column) = args.sort_column {
                table
                    .toggle_sort(column)
                    .with_context(|| format!("Failed to sort benchmark table by {column}"))?;
            }
        }

        table.scroll_to(frame as f64 * step);
        let frame_start = Instant::now();
        let rendered = table.render_pass(&photos);
        let elapsed = frame_start.elapsed().as_secs_f64() * 1000.0;

        // The re-sort lands in this frame; report it separately.
        if frame == args.frames / 2 && args.sort_column.is_some() {
            sort_ms = Some(elapsed);
        } else {
            frame_times_ms.push(elapsed);
        }
        max_rows = max_rows.max(rendered.rows.len());
    }

    let report = BenchmarkReport {
        rows: photos.len(),
        frames_simulated: args.frames,
        total_ms: start.elapsed().as_secs_f64() * 1000.0,
        sort_ms,
        frame_avg_ms: average(&frame_times_ms),
        frame_p50_ms: percentile_ms(&frame_times_ms, 0.50),
        frame_p95_ms: percentile_ms(&frame_times_ms, 0.95),
        frames_over_16ms: frame_times_ms.iter().filter(|t| **t > 16.67).count(),
        frames_over_33ms: frame_times_ms.iter().filter(|t| **t > 33.33).count(),
        max_rows_materialized: max_rows,
    };
    info!(
        rows = report.rows,
        p50 = report.frame_p50_ms,
        p95 = report.frame_p95_ms,
        "Benchmark finished"
    );
    Ok(report)
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn percentile_ms(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let clamped = p.clamp(0.0, 1.0);
    let idx = ((sorted.len() - 1) as f64 * clamped).round() as usize;
    sorted[idx]
}
