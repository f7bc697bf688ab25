/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

use crate::client::cycle::{CycleOutcome, run_cycle};
use crate::client::model::{ClientStatus, StreamEvents};
use crate::connection::{Connection, StreamOptions};
use crate::utils::{ConfigError, StreamError};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Running flag and the stop signal of the current loop generation.
#[derive(Debug)]
struct RunState {
    running: bool,
    generation: u64,
    stop_signal: CancellationToken,
}

#[derive(Debug)]
struct ClientInner {
    connection: Connection,
    options: RwLock<StreamOptions>,
    state: Mutex<RunState>,
    message_sender: mpsc::Sender<String>,
    error_sender: mpsc::Sender<StreamError>,
    stop_sender: mpsc::Sender<()>,
}

impl ClientInner {
    /// Whether `generation` is still the loop that should be running.
    fn is_current(&self, generation: u64) -> bool {
        let state = self.state.lock();
        state.running && state.generation == generation
    }

    /// Releases the running flag for a loop that ended without `stop`, once its
    /// consumer is gone. Returns `false` if `stop` or a newer `start` got there first.
    fn release(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        if !(state.running && state.generation == generation) {
            return false;
        }
        state.running = false;
        state.stop_signal.cancel();
        true
    }
}

/// Client for a single line-delimited stream endpoint, with reconnection built in.
///
/// `start` launches a background Tokio task that connects, forwards every line of
/// the response body to [`StreamEvents::messages`], and reconnects after
/// [`StreamOptions::get_reconnect_delay`] whenever the stream ends, cleanly or not.
/// Failures are reported on [`StreamEvents::errors`] and never end the loop. It
/// ends on `stop`, confirmed once on [`StreamEvents::stopped`] after the loop has
/// finished, or when [`StreamEvents::messages`] is dropped, which returns the client
/// to [`ClientStatus::Idle`] without a confirmation.
///
/// The client is cheap to clone; clones control the same loop.
///
/// # Example
///
/// ```no_run
/// use feed_stream_rs::client::{StreamClient, StreamEvent};
/// use feed_stream_rs::connection::Connection;
///
/// # async fn run() {
/// let connection = Connection::new("user", "password", "ds", "stream", "subscription", "customer");
/// let (client, mut events) = StreamClient::new(connection);
/// client.start();
///
/// while let Some(event) = events.next().await {
///     match event {
///         StreamEvent::Message(line) => println!("{line}"),
///         StreamEvent::Error(err) => eprintln!("{err}"),
///         StreamEvent::Stopped => break,
///     }
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StreamClient {
    inner: Arc<ClientInner>,
}

impl StreamClient {
    /// Creates a client with default options.
    ///
    /// Returns the client together with the receiving ends of its event channels.
    pub fn new(connection: Connection) -> (Self, StreamEvents) {
        Self::with_options(connection, StreamOptions::default())
    }

    /// Creates a client with the given options.
    ///
    /// An empty `connection.domain` is replaced by the default vendor domain.
    pub fn with_options(connection: Connection, options: StreamOptions) -> (Self, StreamEvents) {
        let (message_sender, messages) = mpsc::channel(1);
        let (error_sender, errors) = mpsc::channel(1);
        let (stop_sender, stopped) = mpsc::channel(1);

        let stop_signal = CancellationToken::new();
        // Never started, so there is nothing to signal.
        stop_signal.cancel();

        let client = Self {
            inner: Arc::new(ClientInner {
                connection: connection.normalized(),
                options: RwLock::new(options),
                state: Mutex::new(RunState {
                    running: false,
                    generation: 0,
                    stop_signal,
                }),
                message_sender,
                error_sender,
                stop_sender,
            }),
        };
        let events = StreamEvents {
            messages,
            errors,
            stopped,
        };
        (client, events)
    }

    /// The connection this client reads from.
    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    /// A snapshot of the current options.
    pub fn options(&self) -> StreamOptions {
        self.inner.options.read().clone()
    }

    /// Sets the maximum line size; applies from the next connection attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn set_max_line_buffer_size(&self, size: usize) -> Result<(), ConfigError> {
        self.inner.options.write().set_max_line_buffer_size(size)
    }

    /// Sets the reconnect delay; applies from the next wait.
    ///
    /// # Errors
    ///
    /// Returns an error if `delay` is zero.
    pub fn set_reconnect_delay(&self, delay: Duration) -> Result<(), ConfigError> {
        self.inner.options.write().set_reconnect_delay(delay)
    }

    /// Overrides the endpoint origin; applies from the next connection attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not an absolute `http`/`https` URL.
    pub fn set_endpoint(&self, endpoint: Option<&str>) -> Result<(), ConfigError> {
        self.inner.options.write().set_endpoint(endpoint)
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ClientStatus {
        if self.inner.state.lock().running {
            ClientStatus::Running
        } else {
            ClientStatus::Idle
        }
    }

    /// Whether the client is between a successful `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.status() == ClientStatus::Running
    }

    /// Begins consuming the stream. Returns `false` if it is already running.
    ///
    /// Does not wait for the connection: the loop runs on a new Tokio task.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn start(&self) -> bool {
        let (generation, stop_signal) = {
            let mut state = self.inner.state.lock();
            if state.running {
                debug!("Stream client already running");
                return false;
            }
            state.running = true;
            state.generation += 1;
            state.stop_signal = CancellationToken::new();
            (state.generation, state.stop_signal.clone())
        };

        tokio::spawn(run_loop(self.inner.clone(), generation, stop_signal));
        true
    }

    /// Ends consumption started by `start`. Returns `false` if it is not running.
    ///
    /// Does not wait for the loop: the stop confirmation arrives on
    /// [`StreamEvents::stopped`] once it has finished.
    pub fn stop(&self) -> bool {
        let mut state = self.inner.state.lock();
        if !state.running {
            debug!("Stream client already stopped");
            return false;
        }
        state.running = false;
        state.stop_signal.cancel();
        info!(generation = state.generation, "Stopping stream client");
        true
    }
}

/// Reconnect loop of one generation.
async fn run_loop(inner: Arc<ClientInner>, generation: u64, stop_signal: CancellationToken) {
    info!(generation, "Stream loop started");

    while inner.is_current(generation) && !inner.message_sender.is_closed() {
        let options = inner.options.read().clone();

        match run_cycle(
            &inner.connection,
            &options,
            &inner.message_sender,
            &stop_signal,
        )
        .await
        {
            Ok(CycleOutcome::EndOfStream { delivered }) => {
                info!(generation, delivered, "Stream ended by server");
            }
            Ok(CycleOutcome::Cancelled { delivered }) => {
                debug!(generation, delivered, "Stream cycle cancelled");
            }
            Ok(CycleOutcome::ConsumerGone { delivered }) => {
                warn!(generation, delivered, "Message receiver dropped");
                break;
            }
            Err(err) => {
                warn!(generation, "Stream cycle failed: {}", err);
                tokio::select! {
                    biased;
                    _ = stop_signal.cancelled() => {}
                    sent = inner.error_sender.send(err) => {
                        if sent.is_err() {
                            debug!(generation, "Error receiver dropped");
                        }
                    }
                }
            }
        }

        tokio::select! {
            biased;
            _ = stop_signal.cancelled() => {}
            _ = inner.message_sender.closed() => {}
            _ = tokio::time::sleep(options.get_reconnect_delay()) => {
                debug!(generation, "Reconnecting");
            }
        }
    }

    if inner.release(generation) {
        info!(generation, "Stream loop ended, no consumer left");
        return;
    }

    if inner.stop_sender.send(()).await.is_err() {
        debug!(generation, "Stop receiver dropped");
    }
    info!(generation, "Stream loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> (StreamClient, StreamEvents) {
        let options = StreamOptions::default()
            .with_endpoint("http://127.0.0.1:9")
            .and_then(|o| o.with_reconnect_delay(Duration::from_secs(30)))
            .map(|o| o.with_system_proxy(false))
            .unwrap();
        StreamClient::with_options(
            Connection::new("user", "pass", "ds", "sn", "sub", "acme"),
            options,
        )
    }

    #[test]
    fn test_new_client_is_idle() {
        let (client, _events) = client();
        assert_eq!(client.status(), ClientStatus::Idle);
        assert!(!client.is_running());
    }

    #[test]
    fn test_empty_domain_gets_default() {
        let (client, _events) = StreamClient::new(
            Connection::new("u", "p", "ds", "sn", "sub", "acme").with_domain(""),
        );
        assert_eq!(client.connection().domain, "socialgist.com");
    }

    #[test]
    fn test_stop_before_start_returns_false() {
        let (client, mut events) = client();
        assert!(!client.stop());
        assert!(events.stopped.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_start_twice_returns_false() {
        let (client, _events) = client();
        assert!(client.start());
        assert!(!client.start());
        assert!(client.is_running());
        assert!(client.stop());
    }

    #[tokio::test]
    async fn test_stop_twice_returns_false() {
        let (client, mut events) = client();
        assert!(client.start());
        assert!(client.stop());
        assert!(!client.stop());
        assert_eq!(client.status(), ClientStatus::Idle);

        let stopped = tokio::time::timeout(Duration::from_secs(5), events.stopped.recv()).await;
        assert_eq!(stopped.unwrap(), Some(()));
    }

    #[tokio::test]
    async fn test_options_setters_apply() {
        let (client, _events) = client();
        client.set_max_line_buffer_size(1024).unwrap();
        client
            .set_reconnect_delay(Duration::from_millis(100))
            .unwrap();
        assert!(client.set_max_line_buffer_size(0).is_err());
        assert!(client.set_endpoint(Some("nope")).is_err());

        let options = client.options();
        assert_eq!(options.get_max_line_buffer_size(), 1024);
        assert_eq!(options.get_reconnect_delay(), Duration::from_millis(100));
        assert_eq!(
            options.get_endpoint().map(|u| u.as_str()),
            Some("http://127.0.0.1:9/")
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let (client, mut events) = client();
        let other = client.clone();
        assert!(client.start());
        assert!(!other.start());
        assert!(other.stop());
        assert!(!client.is_running());

        let stopped = tokio::time::timeout(Duration::from_secs(5), events.stopped.recv()).await;
        assert_eq!(stopped.unwrap(), Some(()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stops_confirm_once() {
        let (client, mut events) = client();
        assert!(client.start());

        let barrier = Arc::new(tokio::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let client = client.clone();
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    barrier.wait().await;
                    client.stop()
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(client.status(), ClientStatus::Idle);

        let stopped = tokio::time::timeout(Duration::from_secs(5), events.stopped.recv()).await;
        assert_eq!(stopped.unwrap(), Some(()));
        let again =
            tokio::time::timeout(Duration::from_millis(300), events.stopped.recv()).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn test_dropped_messages_receiver_releases_client() {
        let (client, events) = client();
        let StreamEvents {
            messages,
            mut stopped,
            ..
        } = events;
        assert!(client.start());
        drop(messages);

        let released = tokio::time::timeout(Duration::from_secs(5), async {
            while client.is_running() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(released.is_ok());
        assert!(!client.stop());
        assert!(stopped.try_recv().is_err());
    }
}
