// SPDX-License-Identifier: MPL-2.0

pub const APP_ID: &str = "io.github.pawsandfound.PawsFeed";
pub const APP_NAME: &str = "Paws & Found";

/// Local storage key holding the one cached background image.
pub const BACKGROUND_CACHE_KEY: &str = "paws-bg-image";

/// Background image lifetime (5 minutes).
pub const BACKGROUND_TTL_MS: i64 = 5 * 60 * 1000;

/// Shown whenever the image provider can't give us a photo.
pub const FALLBACK_BACKGROUND_URL: &str =
    "https://images.unsplash.com/photo-1601758228041-f3b2795255f1?w=1920&h=1080&fit=crop";

pub const DEFAULT_IMAGE_QUERY: &str = "pets";
pub const DEFAULT_IMAGE_ORIENTATION: &str = "landscape";

pub const DEFAULT_UNSPLASH_API: &str = "https://api.unsplash.com";
pub const UNSPLASH_PHOTO_PAGE: &str = "https://unsplash.com/photos";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:54321";

/// Upper bound for every outbound HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const CONNECT_TIMEOUT_SECS: u64 = 3;

// Burst overlay timer chain, measured from creation.
pub const OVERLAY_VISIBLE_AT_MS: i64 = 50;
pub const OVERLAY_EXITING_AT_MS: i64 = 750;
pub const OVERLAY_REMOVED_AT_MS: i64 = 1050;

/// Random placement ranges for a burst heart.
pub const OVERLAY_MAX_OFFSET_PX: f32 = 40.0;
pub const OVERLAY_MAX_ROTATION_DEG: f32 = 25.0;

// Notice durations (ms)
pub const NOTICE_DEFAULT_MS: i64 = 5000;
pub const NOTICE_ERROR_MS: i64 = 6000;
