//! Options Admin Frontend Entry Point

mod app;
mod components;
mod config;
mod context;
mod demo;
mod logging;
mod store;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
    mount_to_body(App);
}
