//! Platform glue for running futures.

use std::future::Future;

/// Run a future to completion on the current platform.
///
/// The browser has no blocking executor, so the future is queued on the
/// microtask loop; native hosts simply block.
#[cfg(target_arch = "wasm32")]
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    futures::executor::block_on(future);
}
