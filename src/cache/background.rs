// SPDX-License-Identifier: MPL-2.0

//! Read-through cache for the landing page background photo.
//!
//! Exactly one image is cached at a time, in a single slot of the local
//! key-value store. An entry is usable while `now - timestamp < TTL`; stale or
//! unreadable entries are purged and replaced by a fresh provider fetch.
//! Callers always get a displayable URL back: provider failures resolve to a
//! fixed fallback image without attribution.

use crate::cache::KeyValueStore;
use crate::clock::Clock;
use crate::config::{
    BACKGROUND_CACHE_KEY, BACKGROUND_TTL_MS, DEFAULT_IMAGE_ORIENTATION, DEFAULT_IMAGE_QUERY,
    FALLBACK_BACKGROUND_URL,
};
use crate::unsplash::{ImageProvider, Photo};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Credit for the photographer, shown next to the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub photographer_name: String,
    pub photographer_profile_url: String,
    pub source_page_url: String,
}

impl Attribution {
    fn from_photo(photo: &Photo) -> Self {
        Self {
            photographer_name: photo.user.name.clone(),
            photographer_profile_url: photo.user.links.html.clone(),
            source_page_url: photo.page_url(),
        }
    }

    /// "Photo by <name> on Unsplash"
    pub fn credit_line(&self) -> String {
        format!("Photo by {} on Unsplash", self.photographer_name)
    }
}

/// What the display layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundImage {
    pub url: String,
    pub attribution: Option<Attribution>,
}

impl BackgroundImage {
    pub fn fallback() -> Self {
        Self {
            url: FALLBACK_BACKGROUND_URL.to_string(),
            attribution: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.url == FALLBACK_BACKGROUND_URL && self.attribution.is_none()
    }
}

/// Persisted form of the cache slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedBackgroundImage {
    pub url: String,
    /// Epoch millis at which the entry was written
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photographer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photographer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsplash_url: Option<String>,
}

impl CachedBackgroundImage {
    pub fn new(image: &BackgroundImage, timestamp: i64) -> Self {
        let credit = image.attribution.as_ref();
        Self {
            url: image.url.clone(),
            timestamp,
            photographer: credit.map(|a| a.photographer_name.clone()),
            photographer_url: credit.map(|a| a.photographer_profile_url.clone()),
            unsplash_url: credit.map(|a| a.source_page_url.clone()),
        }
    }

    /// An age that cannot be computed (corrupt timestamp) counts as expired.
    pub fn is_fresh(&self, now_millis: i64) -> bool {
        now_millis
            .checked_sub(self.timestamp)
            .is_some_and(|age| age < BACKGROUND_TTL_MS)
    }

    /// Attribution is only restored when every field survived.
    pub fn attribution(&self) -> Option<Attribution> {
        match (&self.photographer, &self.photographer_url, &self.unsplash_url) {
            (Some(name), Some(profile), Some(page)) => Some(Attribution {
                photographer_name: name.clone(),
                photographer_profile_url: profile.clone(),
                source_page_url: page.clone(),
            }),
            _ => None,
        }
    }

    fn into_image(self) -> BackgroundImage {
        let attribution = self.attribution();
        BackgroundImage {
            url: self.url,
            attribution,
        }
    }
}

/// Single-slot background image cache.
pub struct ImageCache {
    store: Arc<dyn KeyValueStore>,
    provider: Arc<dyn ImageProvider>,
    clock: Arc<dyn Clock>,
    query: String,
    orientation: String,
    current: Mutex<Option<BackgroundImage>>,
}

impl ImageCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn ImageProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            provider,
            clock,
            query: DEFAULT_IMAGE_QUERY.to_string(),
            orientation: DEFAULT_IMAGE_ORIENTATION.to_string(),
            current: Mutex::new(None),
        }
    }

    /// Override the search term and orientation sent to the provider.
    pub fn with_query(mut self, query: &str, orientation: &str) -> Self {
        self.query = query.to_string();
        self.orientation = orientation.to_string();
        self
    }

    /// Last image handed out, if any.
    pub fn current(&self) -> Option<BackgroundImage> {
        self.current.lock().expect("image cache lock poisoned").clone()
    }

    /// Serve the cached image if it is still fresh, otherwise fetch a new one.
    pub async fn load(&self) -> BackgroundImage {
        if let Some(image) = self.read_slot() {
            self.set_current(&image);
            return image;
        }
        self.fetch_new().await
    }

    /// Drop the cached image and load again.
    pub async fn refresh(&self) -> BackgroundImage {
        self.invalidate();
        self.load().await
    }

    /// Remove the cached image unconditionally. The next `load` fetches.
    pub fn invalidate(&self) {
        self.purge();
        *self.current.lock().expect("image cache lock poisoned") = None;
        info!("background image cache cleared");
    }

    /// Ask the provider for a new photo and cache it. Never fails: any
    /// provider problem yields the fallback image, which is not cached.
    pub async fn fetch_new(&self) -> BackgroundImage {
        debug!(query = %self.query, "fetching new background image");

        let photo = match self
            .provider
            .random_photo(&self.query, &self.orientation)
            .await
        {
            Ok(photo) => photo,
            Err(e) => {
                warn!(error = %e, "background image fetch failed, using fallback");
                let image = BackgroundImage::fallback();
                self.set_current(&image);
                return image;
            }
        };

        if let Some(location) = photo.download_location() {
            self.track_download(location.to_string());
        }

        let image = BackgroundImage {
            url: photo.display_url().to_string(),
            attribution: Some(Attribution::from_photo(&photo)),
        };
        self.write_slot(&image);
        self.set_current(&image);
        image
    }

    fn read_slot(&self) -> Option<BackgroundImage> {
        let raw = match self.store.get(BACKGROUND_CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "could not read background image cache");
                self.purge();
                return None;
            }
        };

        let entry: CachedBackgroundImage = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "discarding malformed background image cache");
                self.purge();
                return None;
            }
        };

        if !entry.is_fresh(self.clock.now_millis()) {
            debug!("background image cache expired");
            self.purge();
            return None;
        }

        debug!(url = %entry.url, "using cached background image");
        Some(entry.into_image())
    }

    fn write_slot(&self, image: &BackgroundImage) {
        let entry = CachedBackgroundImage::new(image, self.clock.now_millis());
        let result = serde_json::to_string(&entry)
            .map_err(crate::cache::CacheError::from)
            .and_then(|json| self.store.set(BACKGROUND_CACHE_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "could not persist background image");
        }
    }

    fn purge(&self) {
        if let Err(e) = self.store.remove(BACKGROUND_CACHE_KEY) {
            warn!(error = %e, "could not remove background image cache");
        }
    }

    fn set_current(&self, image: &BackgroundImage) {
        *self.current.lock().expect("image cache lock poisoned") = Some(image.clone());
    }

    /// Fire-and-forget; failures only get logged.
    fn track_download(&self, location: String) {
        let provider = Arc::clone(&self.provider);
        let task = async move {
            if let Err(e) = provider.track_download(&location).await {
                debug!(error = %e, "download tracking failed");
            }
        };
        crate::runtime::spawn_detached(task);
    }
}
