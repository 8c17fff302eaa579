// SPDX-License-Identifier: MPL-2.0

mod client;
mod types;

pub use client::{BackendClient, ClientError, RemoteStore};
pub use types::{PostId, ViewerId};
