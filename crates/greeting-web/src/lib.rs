//! WASM bridge for the greeting page.
//!
//! The page script calls `greeting_start(configJson)` once the document is
//! loaded. Everything after that (personalization fetch, audio, overlay,
//! timeline, gallery) is driven from Rust.

pub mod dom;
pub mod fetch;
pub mod raf;
pub mod runner;

use std::cell::{Cell, RefCell};

use greeting_engine::PageConfig;
use wasm_bindgen::prelude::*;

pub use runner::PageRunner;

thread_local! {
    static RUNNER: RefCell<Option<PageRunner>> = RefCell::new(None);
    /// Set by the first `greeting_start`; the runner itself only exists once
    /// the personalization fetch has finished.
    static STARTED: Cell<bool> = Cell::new(false);
}

/// Run `f` against the page runner. Returns `None` before start, or if the
/// runner is already borrowed further up the stack.
pub(crate) fn with_runner<R>(f: impl FnOnce(&mut PageRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let Ok(mut borrow) = cell.try_borrow_mut() else {
            log::warn!("page runner busy; dropping reentrant call");
            return None;
        };
        borrow.as_mut().map(f)
    })
}

/// True for the first caller only.
fn claim_start() -> bool {
    !STARTED.with(|started| started.replace(true))
}

fn parse_config(json: &str) -> PageConfig {
    if json.trim().is_empty() {
        return PageConfig::default();
    }
    match PageConfig::from_json(json) {
        Ok(config) => config,
        Err(err) => {
            log::error!("invalid page config, using defaults: {}", err);
            PageConfig::default()
        }
    }
}

async fn start(config: PageConfig) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let mut dom = dom::WebDom::new(document);

    match fetch::load_customization(&config.customization_url).await {
        Ok(custom) => {
            let applied = custom.apply(&mut dom);
            log::info!("applied {} of {} customization entries", applied, custom.len());
        }
        Err(err) => log::error!("{}", err),
    }

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(PageRunner::new(config, dom));
    });
    with_runner(|r| r.start()).unwrap_or(Ok(()))
}

#[wasm_bindgen]
pub fn greeting_start(config_json: &str) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    if !claim_start() {
        log::warn!("greeting already started; ignoring");
        return;
    }

    let config = parse_config(config_json);
    wasm_bindgen_futures::spawn_local(async move {
        match start(config).await {
            Ok(()) => log::info!("greeting: initialized"),
            Err(err) => log::error!("greeting failed to start: {:?}", err),
        }
    });
}

#[wasm_bindgen]
pub fn greeting_replay() {
    with_runner(|r| r.replay());
}

#[wasm_bindgen]
pub fn greeting_teardown() {
    with_runner(|r| r.teardown());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_start_is_claimed() {
        assert!(claim_start());
        assert!(!claim_start());
        assert!(!claim_start());
    }

    #[test]
    fn bad_config_falls_back_to_defaults() {
        assert_eq!(parse_config(""), PageConfig::default());
        assert_eq!(parse_config("{\"useUnlockOverlay\": 3}"), PageConfig::default());
        assert!(!parse_config("{\"useUnlockOverlay\": false}").use_unlock_overlay);
    }
}
