// SPDX-License-Identifier: MPL-2.0

use crate::config::UNSPLASH_PHOTO_PAGE;
use serde::Deserialize;

/// The subset of an Unsplash photo object we use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Photo {
    pub id: String,
    pub urls: PhotoUrls,
    pub user: PhotoUser,
    #[serde(default)]
    pub links: PhotoLinks,
}

impl Photo {
    /// URL the background should display.
    pub fn display_url(&self) -> &str {
        &self.urls.regular
    }

    /// Canonical photo page, used for attribution.
    pub fn page_url(&self) -> String {
        format!("{}/{}", UNSPLASH_PHOTO_PAGE, self.id)
    }

    pub fn download_location(&self) -> Option<&str> {
        self.links.download_location.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoUrls {
    pub regular: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoUser {
    pub name: String,
    pub links: UserLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserLinks {
    pub html: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PhotoLinks {
    pub download_location: Option<String>,
}

/// `/photos/random` answers with an array when `count` is given and a bare
/// object otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RandomResponse {
    Many(Vec<Photo>),
    One(Box<Photo>),
}

impl RandomResponse {
    pub(crate) fn into_first(self) -> Option<Photo> {
        match self {
            RandomResponse::Many(photos) => photos.into_iter().next(),
            RandomResponse::One(photo) => Some(*photo),
        }
    }
}

/// Error body: `{"errors": ["..."]}`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
}
