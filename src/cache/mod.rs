// SPDX-License-Identifier: MPL-2.0

mod background;
mod db;
mod schema;
mod store;

pub use background::{Attribution, BackgroundImage, CachedBackgroundImage, ImageCache};
pub use db::CacheDb;
pub use store::{KeyValueStore, MemoryStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("database path error: {0}")]
    Path(String),
}
