//! Browser entry point for the Coeur Du Ciel site.
//!
//! The pages are static HTML; this binary composes the shared header and
//! footer, renders the chosen language and wires the interactive bits.

#[cfg(target_arch = "wasm32")]
mod boot;
#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod wiring;

#[cfg(target_arch = "wasm32")]
fn main() {
    console::install();
    boot::start();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("cdc-site-web runs in the browser; serve it with `trunk serve` from the web/ directory.");
}
