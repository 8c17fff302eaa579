// SPDX-License-Identifier: MPL-2.0

mod client;
mod types;

pub use client::{ImageProvider, ProviderError, UnsplashClient};
pub use types::{Photo, PhotoLinks, PhotoUrls, PhotoUser, UserLinks};
