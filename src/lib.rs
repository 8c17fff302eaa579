// SPDX-License-Identifier: MPL-2.0

//! Like synchronisation and background image caching for the Paws & Found
//! pet feed.
//!
//! [`likes::LikeSync`] keeps a post's heart and counter in step with the
//! hosted store, with optimistic updates that roll back on failure.
//! [`cache::ImageCache`] serves the landing page photo from a single local
//! slot with a five minute lifetime.

pub mod backend;
pub mod cache;
pub mod clock;
pub mod config;
pub mod likes;
pub mod notice;
pub mod runtime;
pub mod settings;
pub mod unsplash;

#[cfg(test)]
mod testing;
