//! Event-driven host for a photo table.
//!
//! The gallery owns the loaded rows, feeds input events to the table and runs
//! the load-more collaborator on the tokio runtime. Completions come back over
//! a flume channel and are applied on the caller's thread by `poll_loads` or
//! `wait_for_load`, so the rows and table state are only ever touched from
//! one place.

use flume::{Receiver, Sender};
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

use crate::config::TableConfig;
use crate::error::{LoadError, TableError};
use crate::models::{Photo, PhotoBatch, PhotoLoader};
use crate::render;
use crate::table::{ColumnKey, ColumnModel, Frame, LoadTicket, PhotoTable, Viewport};

/// A discrete input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GalleryEvent {
    Scroll(f64),
    ScrollToIndex(usize),
    ViewportResize(f64),
    ContainerResize(f32),
    ToggleSort(ColumnKey),
    ResizeStart { column: ColumnKey, pointer_x: f32 },
    ResizeMove(f32),
    ResizeEnd,
    ResizeCancel,
    RowMeasured { index: usize, height: f64 },
}

#[derive(Debug)]
struct LoadCompletion {
    ticket: LoadTicket,
    result: Result<PhotoBatch, LoadError>,
}

pub struct Gallery<L: PhotoLoader> {
    rows: Vec<Photo>,
    table: PhotoTable,
    loader: L,
    runtime: Handle,
    completion_tx: Sender<LoadCompletion>,
    completion_rx: Receiver<LoadCompletion>,
    frame: Frame,
}

impl<L: PhotoLoader> Gallery<L> {
    /// Creates a gallery showing `initial` and computes the first frame.
    ///
    /// Loads are spawned on `runtime`.
    pub fn new(
        loader: L,
        initial: PhotoBatch,
        columns: ColumnModel,
        config: TableConfig,
        viewport: Viewport,
        runtime: Handle,
    ) -> Self {
        let rows = initial.photos;
        let mut table = PhotoTable::new(columns, config, rows.len(), initial.has_more);
        table.set_viewport(viewport);

        let (completion_tx, completion_rx) = flume::unbounded();
        let frame = table.render_pass(&rows);

        let gallery = Self {
            rows,
            table,
            loader,
            runtime,
            completion_tx,
            completion_rx,
            frame,
        };
        if let Some(ticket) = gallery.frame.load_request {
            gallery.dispatch(ticket);
        }
        gallery
    }

    pub fn rows(&self) -> &[Photo] {
        &self.rows
    }

    pub fn table(&self) -> &PhotoTable {
        &self.table
    }

    /// The most recently computed frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn status_line(&self) -> String {
        render::status_line(self.rows.len(), self.frame.is_loading)
    }

    /// Applies an input event and recomputes the frame.
    pub fn handle(&mut self, event: GalleryEvent) -> Result<&Frame, TableError> {
        match event {
            GalleryEvent::Scroll(top) => self.table.scroll_to(top),
            GalleryEvent::ScrollToIndex(index) => {
                self.table.scroll_to_index(index, self.rows.len())
            }
            GalleryEvent::ViewportResize(height) => {
                let scroll_top = self.table.viewport().scroll_top;
                self.table.set_viewport(Viewport::new(scroll_top, height));
            }
            GalleryEvent::ContainerResize(width) => self.table.set_container_width(width),
            GalleryEvent::ToggleSort(column) => {
                self.table.toggle_sort(column)?;
            }
            GalleryEvent::ResizeStart { column, pointer_x } => {
                self.table.begin_resize(column, pointer_x)?
            }
            GalleryEvent::ResizeMove(x) => {
                self.table.drag_resize(x)?;
            }
            GalleryEvent::ResizeEnd => {
                self.table.end_resize()?;
            }
            GalleryEvent::ResizeCancel => {
                self.table.cancel_resize()?;
            }
            GalleryEvent::RowMeasured { index, height } => {
                self.table.measure_row(index, height);
            }
        }
        self.refresh();
        Ok(&self.frame)
    }

    /// Recomputes the frame and starts a load if the table asks for one.
    pub fn refresh(&mut self) {
        self.frame = self.table.render_pass(&self.rows);
        if let Some(ticket) = self.frame.load_request {
            self.dispatch(ticket);
        }
    }

    fn dispatch(&self, ticket: LoadTicket) {
        let loader = self.loader.clone();
        let tx = self.completion_tx.clone();
        let task = self.runtime.spawn(async move { loader.load_more().await });

        self.runtime.spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(err) => {
                    error!(ticket = ticket.id(), error = ?err, "Load task did not finish");
                    Err(LoadError::Aborted)
                }
            };
            if tx.send(LoadCompletion { ticket, result }).is_err() {
                debug!(ticket = ticket.id(), "Gallery dropped before load finished");
            }
        });
        debug!(ticket = ticket.id(), loaded = self.rows.len(), "Dispatched load");
    }

    fn apply(&mut self, completion: LoadCompletion) -> bool {
        let LoadCompletion { ticket, result } = completion;
        match result {
            Ok(batch) => {
                let appended = batch.photos.len();
                if !self.table.complete_load(ticket, appended, batch.has_more) {
                    return false;
                }
                self.rows.extend(batch.photos);
                true
            }
            Err(err) => {
                if !self.table.fail_load(ticket, &err) {
                    warn!(ticket = ticket.id(), error = ?err, "Dropping failure of a stale load");
                }
                false
            }
        }
    }

    /// Applies every finished load without blocking. Returns how many were
    /// applied.
    pub fn poll_loads(&mut self) -> usize {
        let mut applied = 0;
        let mut appended = false;
        while let Ok(completion) = self.completion_rx.try_recv() {
            appended |= self.apply(completion);
            applied += 1;
        }
        if applied > 0 {
            self.after_loads(appended);
        }
        applied
    }

    /// Waits for the outstanding load, if any, and applies it.
    ///
    /// Returns `Ok(false)` when nothing was in flight.
    pub async fn wait_for_load(&mut self) -> Result<bool, LoadError> {
        if self.table.state().load.in_flight().is_none() {
            return Ok(false);
        }
        let completion = self
            .completion_rx
            .recv_async()
            .await
            .map_err(|_| LoadError::Disconnected)?;
        let appended = self.apply(completion);
        self.after_loads(appended);
        Ok(true)
    }

    /// Appended rows are a data event and may trigger the next page. A failed
    /// load only redraws; the retry waits for the next user event.
    fn after_loads(&mut self, appended: bool) {
        if appended {
            self.refresh();
        } else {
            self.frame = self.table.redraw(&self.rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MockPhotoSource, MockSourceConfig};
    use crate::table::LoadPhase;
    use std::time::Duration;

    fn make_gallery(config: MockSourceConfig) -> (Gallery<MockPhotoSource>, MockPhotoSource) {
        let source = MockPhotoSource::new(config);
        let initial = source.initial_page();
        let gallery = Gallery::new(
            source.clone(),
            initial,
            ColumnModel::photo_default(),
            TableConfig::default(),
            Viewport::new(0.0, 800.0),
            Handle::current(),
        );
        (gallery, source)
    }

    fn fast() -> MockSourceConfig {
        MockSourceConfig::default().latency(Duration::from_millis(20))
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_frame_does_not_load() {
        let (gallery, source) = make_gallery(fast());
        assert_eq!(gallery.rows().len(), 50);
        assert_eq!(gallery.frame().load_request, None);
        assert_eq!(gallery.status_line(), "50 photos loaded");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_near_end_loads_once() {
        let (mut gallery, source) = make_gallery(fast());

        let frame = gallery.handle(GalleryEvent::Scroll(40.0 * 80.0)).unwrap();
        assert!(frame.load_request.is_some());
        assert_eq!(gallery.status_line(), "50 photos loaded • Loading...");

        // More events while loading do not issue more requests.
        for top in [3210.0, 3220.0, 3230.0] {
            let frame = gallery.handle(GalleryEvent::Scroll(top)).unwrap();
            assert_eq!(frame.load_request, None);
        }

        assert!(gallery.wait_for_load().await.unwrap());
        assert_eq!(gallery.rows().len(), 100);
        assert_eq!(source.calls(), 1);
        assert_eq!(gallery.table().state().load.phase(), LoadPhase::Idle);
        assert!(!gallery.frame().is_loading);
        assert!(!gallery.wait_for_load().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_recovers_on_next_scroll() {
        let (mut gallery, source) = make_gallery(fast());
        source.inject_failures(1);

        gallery.handle(GalleryEvent::Scroll(4000.0)).unwrap();
        assert!(gallery.wait_for_load().await.unwrap());
        assert_eq!(gallery.rows().len(), 50);
        assert_eq!(gallery.table().state().load.phase(), LoadPhase::Idle);
        // No automatic retry.
        assert_eq!(gallery.frame().load_request, None);

        let frame = gallery.handle(GalleryEvent::Scroll(4000.0)).unwrap();
        assert!(frame.load_request.is_some());
        gallery.wait_for_load().await.unwrap();
        assert_eq!(gallery.rows().len(), 100);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_until_exhausted() {
        let (mut gallery, source) = make_gallery(fast().total(120));

        for _ in 0..10 {
            gallery.handle(GalleryEvent::Scroll(f64::INFINITY)).unwrap();
            gallery.wait_for_load().await.unwrap();
        }

        assert_eq!(gallery.rows().len(), 120);
        assert_eq!(gallery.table().state().load.phase(), LoadPhase::Exhausted);
        assert_eq!(source.calls(), 2);

        let frame = gallery.handle(GalleryEvent::Scroll(f64::INFINITY)).unwrap();
        assert_eq!(frame.load_request, None);
        assert_eq!(frame.window.last_visible(), Some(119));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_loads_applies_finished_pages() {
        let (mut gallery, _source) = make_gallery(fast());
        gallery.handle(GalleryEvent::Scroll(4000.0)).unwrap();
        assert_eq!(gallery.poll_loads(), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        tokio::task::yield_now().await;

        assert_eq!(gallery.poll_loads(), 1);
        assert_eq!(gallery.rows().len(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sort_survives_appends() {
        let (mut gallery, _source) = make_gallery(fast());
        gallery.handle(GalleryEvent::ToggleSort(ColumnKey::TakenDate)).unwrap();
        gallery.handle(GalleryEvent::Scroll(f64::INFINITY)).unwrap();
        gallery.wait_for_load().await.unwrap();

        let rows = gallery.rows();
        let order = gallery.table().order();
        assert_eq!(order.len(), 100);
        for pair in order.windows(2) {
            assert!(rows[pair[0]].taken_date <= rows[pair[1]].taken_date);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_events_are_rejected() {
        let (mut gallery, _source) = make_gallery(fast());
        assert!(matches!(
            gallery.handle(GalleryEvent::ToggleSort(ColumnKey::Thumbnail)),
            Err(TableError::NotSortable(ColumnKey::Thumbnail))
        ));
        assert!(matches!(
            gallery.handle(GalleryEvent::ResizeEnd),
            Err(TableError::NoActiveResize)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_row_measurement_events() {
        let (mut gallery, _source) = make_gallery(fast());
        let frame = gallery
            .handle(GalleryEvent::RowMeasured { index: 1, height: 200.0 })
            .unwrap();
        assert_eq!(frame.rows[1].height, 200.0);
        assert_eq!(frame.window.total_height, 50.0 * 80.0 + 120.0);

        let frame = gallery
            .handle(GalleryEvent::RowMeasured {
                index: usize::MAX,
                height: 200.0,
            })
            .unwrap();
        assert_eq!(frame.window.total_height, 50.0 * 80.0 + 120.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_gesture_through_events() {
        let (mut gallery, _source) = make_gallery(fast());
        gallery
            .handle(GalleryEvent::ResizeStart {
                column: ColumnKey::Path,
                pointer_x: 100.0,
            })
            .unwrap();
        gallery.handle(GalleryEvent::ResizeMove(150.0)).unwrap();
        let frame = gallery.handle(GalleryEvent::ResizeCancel).unwrap();
        let path = frame.headers.iter().find(|h| h.key == ColumnKey::Path).unwrap();
        assert_eq!(path.width, 250.0);
    }
}
