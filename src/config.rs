//! Dashboard Configuration
//!
//! Resolves where the options API lives and builds the repository the
//! editor talks to.

use std::sync::Arc;

use options_core::{ApiConfig, HttpOptionsRepository, InMemoryOptionsRepository, SharedRepository};

use crate::{demo, logging};

/// localStorage key holding the dashboard's bearer token
const AUTH_TOKEN_KEY: &str = "authToken";

fn window() -> Result<web_sys::Window, String> {
    web_sys::window().ok_or_else(|| "no browser window".to_string())
}

fn api_base(window: &web_sys::Window) -> Result<String, String> {
    if let Some(base) = option_env!("OPTIONS_API_BASE") {
        return Ok(base.to_string());
    }
    let origin = window
        .location()
        .origin()
        .map_err(|_| "window origin unavailable".to_string())?;
    Ok(format!("{}/api", origin))
}

fn stored_token(window: &web_sys::Window) -> Option<String> {
    window
        .local_storage()
        .ok()
        .flatten()
        .and_then(|storage| storage.get_item(AUTH_TOKEN_KEY).ok().flatten())
}

/// API settings for this page
pub fn load_api_config() -> Result<ApiConfig, String> {
    let window = window()?;
    let mut config = ApiConfig::new(api_base(&window)?).with_auth_token(stored_token(&window));
    if let Some(level) = option_env!("OPTIONS_LOG_LEVEL") {
        config = config.with_log_level(level);
    }
    config.validate().map_err(|e| e.to_string())
}

/// `?demo` in the page URL selects the in-memory backend
pub fn demo_requested() -> bool {
    window()
        .and_then(|w| w.location().search().map_err(|_| String::new()))
        .map(|search| {
            search
                .trim_start_matches('?')
                .split('&')
                .any(|pair| pair == "demo" || pair.starts_with("demo="))
        })
        .unwrap_or(false)
}

/// Repository for the dashboard: seeded memory in demo mode, the HTTP
/// API otherwise. Applies the configured log level.
pub fn build_repository() -> Result<SharedRepository, String> {
    if demo_requested() {
        log::info!("[CONFIG] demo mode, using in-memory options");
        let repo = InMemoryOptionsRepository::new();
        demo::seed(&repo);
        return Ok(Arc::new(repo));
    }

    let config = load_api_config()?;
    if let Ok(level) = config.log_level_filter() {
        logging::init(level);
    }
    log::info!("[CONFIG] options API at {}", config.base_url);
    let repo = HttpOptionsRepository::new(&config).map_err(|e| e.to_string())?;
    Ok(Arc::new(repo))
}
