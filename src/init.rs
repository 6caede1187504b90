use crate::error::JournalError;
use crate::journald::{JournaldConfig, JournaldSink};
use crate::layer::JournalLayer;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the globally installed journal layer.
///
/// **Fields**
/// - `journal`: where the journald socket lives.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top of [`JournalLayer`] and every event is also printed
///   to the console.
#[derive(Clone, Debug, Default)]
pub struct LayerConfig {
    pub journal: JournaldConfig,
    pub enable_stdout: bool,
}

/// Error returned when the journal subscriber could not be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error("failed to set global subscriber: {0}")]
    GlobalDefault(#[from] SetGlobalDefaultError),
}

/// Install a global `tracing` subscriber that forwards every event to
/// journald as configured by `config`.
///
/// **Effects**
///
/// This installs a [`Registry`] combined with [`JournalLayer`] as the
/// global default subscriber. Level filtering is left to whatever the
/// caller adds; the layer itself accepts every level.
pub fn init_tracing_with_config(config: LayerConfig) -> Result<(), InitError> {
    let sink = JournaldSink::with_config(config.journal)?;
    let layer = JournalLayer::new(sink);

    // Two branches because the stacked subscriber types differ.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Initialize journal forwarding with defaults: the system journald
/// socket and no console output.
pub fn init_tracing() -> Result<(), InitError> {
    init_tracing_with_config(LayerConfig::default())
}
