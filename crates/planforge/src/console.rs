//! Console logging for PlanForge runs.
//!
//! Opt-in via the `console` feature. Installs a formatted `tracing`
//! subscriber filtered through `RUST_LOG`, so simulation and RuleSeek
//! events are printed without any wiring in the host application.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the console subscriber.
///
/// Safe to call multiple times; only the first call has effect. `RUST_LOG`
/// overrides the default filter, which keeps PlanForge engine events at
/// INFO and everything else at WARN. A subscriber already installed by the
/// host application keeps precedence.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warn,planforge_sim=info,planforge_seek=info")
        });
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
