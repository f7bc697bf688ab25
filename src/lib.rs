//! # Feed Stream Rust Client
//!
//! A Rust client for long-lived, line-delimited JSON feeds served over HTTP. It keeps
//! a single `GET` open against the feed endpoint, hands every line of the body to the
//! application as soon as it arrives, and reconnects on its own whenever the stream
//! ends, whether because of an error or because the server closed it.
//!
//! ## Features
//!
//! - **Lifecycle control**:
//!   - Non-blocking `start` / `stop`, safe to call repeatedly and from several tasks
//!   - Exactly one stop confirmation per successful `stop`, delivered after the
//!     background loop has finished
//!   - A fresh cancellation token for every start, so restarts carry no state over
//!
//! - **Streaming**:
//!   - Basic authentication against
//!     `https://{customer}.{domain}/stream/{data_source}_{stream_name}/subscription/{subscription_name}/part/1/data.json`
//!   - Lines are delivered as raw text; the JSON content is never parsed
//!   - Backpressure: the socket is only read when the consumer has taken the
//!     previous line
//!   - Configurable maximum line size (64 MiB by default); longer lines fail the cycle
//!
//! - **Reconnection**:
//!   - Fixed reconnect delay (60 seconds by default), interrupted by `stop`
//!   - Every failure is non-fatal and reported once on the error channel
//!
//! ## Usage
//!
//! ```no_run
//! use feed_stream_rs::client::{StreamClient, StreamEvent};
//! use feed_stream_rs::connection::{Connection, StreamOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = Connection::new(
//!     "username",
//!     "password",
//!     "data-source",
//!     "stream",
//!     "subscription",
//!     "customer",
//! );
//! let options = StreamOptions::new().with_reconnect_delay(Duration::from_secs(10))?;
//! let (client, mut events) = StreamClient::with_options(connection, options);
//!
//! client.start();
//! while let Some(event) = events.next().await {
//!     match event {
//!         StreamEvent::Message(line) => println!("{line}"),
//!         StreamEvent::Error(err) => eprintln!("stream error: {err}"),
//!         StreamEvent::Stopped => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!

/// Module containing utility functions and error types.
///
/// This module provides the error types, the logger setup and the signal hook
/// used by the command-line client.
pub mod utils;

/// Module containing client-related functionality.
///
/// This module provides the main `StreamClient` type, its lifecycle status and the
/// events it delivers.
pub mod client;

/// Module containing connection-related functionality.
///
/// This module provides the connection descriptor and the stream options.
pub mod connection;
