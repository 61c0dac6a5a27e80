use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use phototable::bench::{run_benchmark, BenchmarkArgs};
use phototable::models::{MockPhotoSource, MockSourceConfig};
use phototable::render::TextRenderer;
use phototable::table::{ColumnKey, ColumnModel, LayoutMode, SortCycle, Viewport};
use phototable::{Gallery, GalleryEvent, TableConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    Fixed,
    Flex,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Cycle {
    TwoState,
    ThreeState,
}

/// Scrolls a photo table over a paged mock catalog and prints each frame.
#[derive(Debug, Parser)]
#[command(name = "phototable", version)]
struct Args {
    /// Photos in the catalog
    #[arg(long, default_value_t = 1000)]
    rows: usize,

    /// Photos per page
    #[arg(long, default_value_t = 50)]
    batch_size: usize,

    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,

    #[arg(long, default_value_t = 1430.0)]
    container_width: f32,

    #[arg(long, value_enum, default_value = "fixed")]
    layout: Layout,

    #[arg(long, value_enum, default_value = "two-state")]
    sort_cycle: Cycle,

    /// Simulated latency of each page load
    #[arg(long, default_value_t = 500)]
    latency_ms: u64,

    /// Run the scroll benchmark instead of the demo
    #[arg(long)]
    bench: bool,

    /// Frames to simulate
    #[arg(long, default_value_t = 60)]
    frames: usize,

    /// Sort by this column before scrolling (path, caption, takenDate)
    #[arg(long)]
    sort: Option<String>,
}

impl Args {
    fn table_config(&self) -> TableConfig {
        let layout = match self.layout {
            Layout::Fixed => LayoutMode::Fixed,
            Layout::Flex => LayoutMode::Flex,
        };
        let cycle = match self.sort_cycle {
            Cycle::TwoState => SortCycle::AscDesc,
            Cycle::ThreeState => SortCycle::AscDescNone,
        };
        TableConfig::default().layout(layout).sort_cycle(cycle)
    }

    fn columns(&self) -> ColumnModel {
        match self.layout {
            Layout::Fixed => ColumnModel::photo_default(),
            Layout::Flex => ColumnModel::photo_flex(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("phototable=info".parse().context("Invalid log directive")?),
        )
        .init();

    let args = Args::parse();
    let sort_column = args
        .sort
        .as_deref()
        .map(|name| ColumnKey::parse(name).with_context(|| format!("Unknown column '{name}'")))
        .transpose()?;

    if args.bench {
        let report = run_benchmark(&BenchmarkArgs {
            rows: args.rows,
            frames: args.frames,
            viewport_height: args.viewport_height,
            container_width: args.container_width,
            config: args.table_config(),
            sort_column: sort_column.or(Some(ColumnKey::TakenDate)),
        })?;
        println!("{}", report.summary());
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(run_demo(args, sort_column))
}

async fn run_demo(args: Args, sort_column: Option<ColumnKey>) -> Result<()> {
    let source = MockPhotoSource::new(
        MockSourceConfig::default()
            .total(args.rows)
            .batch_size(args.batch_size)
            .latency(Duration::from_millis(args.latency_ms)),
    );
    let initial = source.initial_page();
    let mut gallery = Gallery::new(
        source,
        initial,
        args.columns(),
        args.table_config(),
        Viewport::new(0.0, args.viewport_height),
        tokio::runtime::Handle::current(),
    );
    gallery
        .handle(GalleryEvent::ContainerResize(args.container_width))
        .context("Failed to size table")?;
    if let Some(column) = sort_column {
        gallery
            .handle(GalleryEvent::ToggleSort(column))
            .with_context(|| format!("Failed to sort by {column}"))?;
    }

    let renderer = TextRenderer::default();
    let step = args.viewport_height / 2.0;

    for frame_index in 0..args.frames {
        let scroll_top = gallery.frame().window.scroll_top + step;
        let frame = gallery
            .handle(GalleryEvent::Scroll(scroll_top))
            .context("Scroll event rejected")?;

        println!("--- frame {frame_index} (scroll {:.0}) ---", frame.window.scroll_top);
        for line in renderer.render(frame).iter().take(5) {
            println!("{line}");
        }

        if gallery.frame().is_loading {
            gallery.wait_for_load().await.context("Photo load failed")?;
        }
    }

    info!(loaded = gallery.rows().len(), "Demo finished");
    println!("{}", gallery.status_line());
    Ok(())
}
