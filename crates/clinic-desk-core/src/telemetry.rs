//! Process-wide logging setup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the fmt subscriber. `RUST_LOG` wins over `default_filter`.
/// Only the first call has any effect.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // Another subscriber may already be installed by the host.
        let _ = fmt().with_env_filter(filter).try_init();
        tracing::info!("ClinicDesk tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init_tracing("clinic_desk_core=debug");
        super::init_tracing("clinic_desk_core=trace");
    }
}
