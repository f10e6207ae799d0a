//! Log output setup.
//!
//! The library itself only emits `tracing` events. Hosts call [`init`] once
//! to see them: in the browser they go to the devtools console, natively to
//! stderr filtered by `RUST_LOG` (default `warn`).

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Install the global subscriber. Safe to call more than once; later calls
/// leave the first subscriber in place.
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    {
        use tracing::Level;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;
        use tracing_wasm::{WASMLayer, WASMLayerConfigBuilder};

        let config = WASMLayerConfigBuilder::new()
            .set_max_level(Level::WARN)
            .build();
        let _ = tracing_subscriber::registry()
            .with(WASMLayer::new(config))
            .try_init();
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init();
    }
}

/// Runs when the wasm module is instantiated.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    init();
    tracing::debug!("tone generator core loaded");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::warn!("logging initialised twice without panicking");
    }
}
