// SPDX-License-Identifier: MPL-2.0

//! Runtime plumbing for the binary and for background work the library
//! starts on its own (download tracking).

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::{Handle, Runtime};

const THREAD_NAME: &str = "pawsfeed-async";

/// Two workers are plenty for I/O-bound requests.
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name(THREAD_NAME)
        .build()
        .expect("failed to create async runtime")
});

/// Run `future` to completion on the shared runtime.
/// Must not be called from inside another runtime.
pub fn block_on<F: Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}

/// Start `task` and forget about it. It runs on the caller's runtime when
/// there is one and on the shared runtime otherwise.
pub fn spawn_detached<F>(task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => {
            RUNTIME.spawn(task);
        }
    }
}
