use chrono::{DateTime, Utc};

/// A single photo record as loaded from the photo source.
///
/// Rows are immutable once loaded; `id` is the identity, everything else is
/// display data.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: String,
    /// Opaque reference to the thumbnail image (URL or cache key).
    pub thumbnail: String,
    pub path: String,
    pub caption: String,
    pub taken_date: DateTime<Utc>,
    pub tags: Vec<String>,
    pub peoples: Vec<String>,
    pub flags: Vec<String>,
}

impl Photo {
    /// Create a photo with just the identity and sortable fields set.
    pub fn new(
        id: impl Into<String>,
        path: impl Into<String>,
        caption: impl Into<String>,
        taken_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            thumbnail: String::new(),
            path: path.into(),
            caption: caption.into(),
            taken_date,
            tags: Vec::new(),
            peoples: Vec::new(),
            flags: Vec::new(),
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_peoples<I, S>(mut self, peoples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.peoples = peoples.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder_fields() {
        let taken = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let photo = Photo::new("photo-1", "/photos/2024/a.jpg", "Sunset", taken)
            .with_thumbnail("thumb://1")
            .with_tags(["landscape", "sunset"])
            .with_peoples(["Jane Smith"])
            .with_flags(["favorite"]);

        assert_eq!(photo.id, "photo-1");
        assert_eq!(photo.thumbnail, "thumb://1");
        assert_eq!(photo.tags, vec!["landscape", "sunset"]);
        assert_eq!(photo.peoples.len(), 1);
        assert_eq!(photo.flags, vec!["favorite"]);
    }
}
