//! Deterministic mock photo catalog and a paging source over it.
//!
//! The catalog stands in for a real photo library: 1000 records cycling
//! through fixed caption/tag/people/flag tables, with dates and file names
//! drawn from a per-record seeded RNG so runs are reproducible.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::error::LoadError;
use crate::models::Photo;

/// Rows returned per page.
pub const BATCH_SIZE: usize = 50;

/// Size of the mock catalog.
pub const CATALOG_SIZE: usize = 1000;

/// Simulated network latency per page.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

const SAMPLE_IMAGES: [&str; 4] = [
    "https://picsum.photos/400/300?random=1",
    "https://picsum.photos/400/300?random=2",
    "https://picsum.photos/400/300?random=3",
    "https://picsum.photos/400/300?random=4",
];

const CAPTIONS: [&str; 10] = [
    "Beautiful sunset over the mountain lake",
    "Urban life in the golden hour",
    "Macro details of nature's beauty",
    "Modern architecture meets the sky",
    "Street photography at its finest",
    "Serene landscape composition",
    "Abstract architectural patterns",
    "Natural light and shadows",
    "Colorful urban environment",
    "Peaceful nature scene",
];

const TAGS: [&[&str]; 10] = [
    &["landscape", "sunset", "nature"],
    &["street", "urban", "people"],
    &["macro", "butterfly", "flower"],
    &["architecture", "modern", "glass"],
    &["portrait", "studio", "professional"],
    &["travel", "vacation", "memories"],
    &["wildlife", "outdoor", "adventure"],
    &["food", "delicious", "cooking"],
    &["technology", "gadget", "modern"],
    &["art", "creative", "inspiration"],
];

const PEOPLE: [&[&str]; 10] = [
    &["John Doe", "Jane Smith"],
    &["Alice Johnson"],
    &[],
    &["Bob Wilson", "Carol Brown", "David Lee"],
    &["Emma Davis"],
    &["Frank Miller", "Grace Taylor"],
    &[],
    &["Henry Clark", "Ivy Lewis"],
    &["Jack Hall"],
    &["Kate Young", "Liam King"],
];

const FLAGS: [&[&str]; 10] = [
    &["favorite", "edited"],
    &["private"],
    &["public", "featured"],
    &["draft"],
    &["favorite", "shared"],
    &["archived"],
    &["favorite", "public"],
    &["private", "edited"],
    &["featured"],
    &["shared", "favorite"],
];

fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Builds record `index` of the catalog.
pub fn mock_photo(index: usize) -> Photo {
    let mut rng = StdRng::seed_from_u64(index as u64);
    let days: i64 = rng.gen_range(0..365);
    let hours: i64 = rng.gen_range(0..24);
    let minutes: i64 = rng.gen_range(0..60);
    let serial: u32 = rng.gen_range(0..9999);

    let taken_date = base_date()
        + ChronoDuration::days(days)
        + ChronoDuration::hours(hours)
        + ChronoDuration::minutes(minutes);
    let number = index + 1;

    Photo::new(
        format!("photo-{number}"),
        format!("/photos/2024/{number:04}_IMG_{serial:04}.jpg"),
        CAPTIONS[index % CAPTIONS.len()],
        taken_date,
    )
    .with_thumbnail(SAMPLE_IMAGES[index % SAMPLE_IMAGES.len()])
    .with_tags(TAGS[index % TAGS.len()].iter().copied())
    .with_peoples(PEOPLE[index % PEOPLE.len()].iter().copied())
    .with_flags(FLAGS[index % FLAGS.len()].iter().copied())
}

/// The first `count` records of the catalog.
pub fn catalog(count: usize) -> Vec<Photo> {
    (0..count).map(mock_photo).collect()
}

/// One page returned by a loader.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoBatch {
    pub photos: Vec<Photo>,
    pub has_more: bool,
}

/// The load-more collaborator: appends the next page of rows.
pub trait PhotoLoader: Clone + Send + Sync + 'static {
    fn load_more(&self) -> impl Future<Output = Result<PhotoBatch, LoadError>> + Send;
}

#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Rows per page (default: 50)
    pub batch_size: usize,
    /// Rows in the catalog (default: 1000)
    pub total: usize,
    /// Delay before each page is returned (default: 500ms)
    pub latency: Duration,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            total: CATALOG_SIZE,
            latency: DEFAULT_LATENCY,
        }
    }
}

impl MockSourceConfig {
    pub fn batch_size(mut self, rows: usize) -> Self {
        self.batch_size = rows.max(1);
        self
    }

    pub fn total(mut self, rows: usize) -> Self {
        self.total = rows;
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[derive(Debug, Default)]
struct SourceState {
    cursor: usize,
    loading: bool,
    /// Number of upcoming calls that fail.
    failures: usize,
    calls: usize,
}

/// Paged source over the mock catalog.
///
/// Clones share the cursor. Calls made while a page is already being served,
/// or after the catalog is exhausted, return an empty page.
#[derive(Debug, Clone)]
pub struct MockPhotoSource {
    config: MockSourceConfig,
    catalog: Arc<Vec<Photo>>,
    state: Arc<Mutex<SourceState>>,
}

impl MockPhotoSource {
    pub fn new(config: MockSourceConfig) -> Self {
        let catalog = Arc::new(catalog(config.total));
        Self {
            config,
            catalog,
            state: Arc::new(Mutex::new(SourceState::default())),
        }
    }

    /// The first page, served synchronously. Advances the cursor.
    pub fn initial_page(&self) -> PhotoBatch {
        let mut state = self.state.lock();
        self.take_page(&mut state)
    }

    /// Makes the next `count` calls to `load_more` fail.
    pub fn inject_failures(&self, count: usize) {
        self.state.lock().failures = count;
    }

    /// Rows handed out so far.
    pub fn cursor(&self) -> usize {
        self.state.lock().cursor
    }

    /// Number of `load_more` calls received.
    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }

    fn take_page(&self, state: &mut SourceState) -> PhotoBatch {
        let start = state.cursor.min(self.catalog.len());
        let end = (start + self.config.batch_size).min(self.catalog.len());
        state.cursor = end;
        PhotoBatch {
            photos: self.catalog[start..end].to_vec(),
            has_more: end < self.catalog.len(),
        }
    }
}

impl PhotoLoader for MockPhotoSource {
    fn load_more(&self) -> impl Future<Output = Result<PhotoBatch, LoadError>> + Send {
        let source = self.clone();
        async move {
            {
                let mut state = source.state.lock();
                state.calls += 1;
                let has_more = state.cursor < source.catalog.len();
                if state.loading || !has_more {
                    trace!(loading = state.loading, has_more, "Ignoring load request");
                    return Ok(PhotoBatch {
                        photos: Vec::new(),
                        has_more,
                    });
                }
                state.loading = true;
            }

            tokio::time::sleep(source.config.latency).await;

            let mut state = source.state.lock();
            state.loading = false;
            if state.failures > 0 {
                state.failures -= 1;
                return Err(LoadError::Source("simulated source failure".into()));
            }
            let page = source.take_page(&mut state);
            debug!(rows = page.photos.len(), cursor = state.cursor, "Served photo page");
            Ok(page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_deterministic() {
        let a = catalog(20);
        let b = catalog(20);
        assert_eq!(a, b);
        assert_eq!(a[0].id, "photo-1");
        assert!(a[0].path.starts_with("/photos/2024/0001_IMG_"));
        assert_eq!(a[3].caption, CAPTIONS[3]);
        assert_eq!(a[3].peoples.len(), 3);
        assert!(a[2].peoples.is_empty());
        assert_eq!(a[5].thumbnail, SAMPLE_IMAGES[1]);
    }

    #[test]
    fn test_dates_fall_in_2024() {
        let start = base_date();
        let end = start + ChronoDuration::days(366);
        for photo in catalog(CATALOG_SIZE) {
            assert!(photo.taken_date >= start && photo.taken_date < end);
        }
    }

    #[test]
    fn test_seeded_fields_vary_between_records() {
        let photos = catalog(100);
        let dates: std::collections::HashSet<_> = photos.iter().map(|p| p.taken_date).collect();
        assert!(dates.len() > 50);
        for photo in &photos {
            let serial = &photo.path[photo.path.len() - 8..photo.path.len() - 4];
            assert!(serial.chars().all(|c| c.is_ascii_digit()), "{}", photo.path);
        }
        assert_eq!(mock_photo(42), photos[42]);
    }

    #[test]
    fn test_initial_page() {
        let source = MockPhotoSource::new(MockSourceConfig::default());
        let page = source.initial_page();
        assert_eq!(page.photos.len(), 50);
        assert!(page.has_more);
        assert_eq!(source.cursor(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_until_exhausted() {
        let source = MockPhotoSource::new(MockSourceConfig::default().total(120));
        let mut loaded = source.initial_page().photos.len();

        let page = source.load_more().await.unwrap();
        loaded += page.photos.len();
        assert!(page.has_more);

        let page = source.load_more().await.unwrap();
        loaded += page.photos.len();
        assert_eq!(page.photos.len(), 20);
        assert!(!page.has_more);
        assert_eq!(loaded, 120);

        let page = source.load_more().await.unwrap();
        assert!(page.photos.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_call_is_ignored() {
        let source = MockPhotoSource::new(MockSourceConfig::default());
        let (first, second) = tokio::join!(source.load_more(), source.load_more());
        let sizes = [first.unwrap().photos.len(), second.unwrap().photos.len()];
        assert!(sizes.contains(&0));
        assert!(sizes.contains(&50));
        assert_eq!(source.cursor(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_injected_failure_keeps_cursor() {
        let source = MockPhotoSource::new(MockSourceConfig::default());
        source.initial_page();
        source.inject_failures(1);

        assert!(matches!(source.load_more().await, Err(LoadError::Source(_))));
        assert_eq!(source.cursor(), 50);

        let page = source.load_more().await.unwrap();
        assert_eq!(page.photos.len(), 50);
        assert_eq!(source.cursor(), 100);
    }
}
