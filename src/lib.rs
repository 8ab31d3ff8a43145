//! Calculators, converters and site tooling for the DapsiWow tools website,
//! compiled to WebAssembly.
//!
//! Pages call the exports in [`assembly`] with their form state as JSON; every
//! formula lives in a plain Rust module so it can be tested natively.

pub mod activity;
pub mod assembly;
pub mod body;
pub mod catalog;
mod file_utils;
pub mod growth;
pub mod pdf_form;
pub mod schema;
pub mod sitemap;
pub mod text_tools;
pub mod units;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Installs console logging and the panic hook when the module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
}
