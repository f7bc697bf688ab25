use signal_hook::low_level::signal_name;
use signal_hook::{consts::SIGINT, consts::SIGTERM, iterator::Signals};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

/// Masks a secret for log and debug output with asterisks, one per character up
/// to eight, so the length of longer secrets is not revealed.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "*".repeat(secret.chars().count().min(8))
    }
}

/// Sets up a signal hook for SIGINT and SIGTERM.
///
/// A detached thread waits for the first of these signals, logs its name and wakes
/// `shutdown_signal`. The caller is expected to react by stopping its
/// [`StreamClient`](crate::client::StreamClient).
///
/// # Errors
///
/// Returns an error if the signal handlers cannot be registered.
pub fn setup_signal_hook(shutdown_signal: Arc<Notify>) -> std::io::Result<()> {
    let signals = &[SIGINT, SIGTERM];
    let mut signals_iterator = Signals::new(signals)?;

    std::thread::Builder::new()
        .name("signal-hook".to_string())
        .spawn(move || {
            if let Some(signal) = signals_iterator.forever().next() {
                info!(
                    "Received signal: {}",
                    signal_name(signal).unwrap_or("unknown")
                );
                shutdown_signal.notify_one();
            }
        })?;

    Ok(())
}
