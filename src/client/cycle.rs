/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! One connect-and-stream cycle: open the feed, push every line to the consumer,
//! return when the stream ends, fails or is cancelled.

use crate::client::codec::FeedLineCodec;
use crate::client::request::StreamRequest;
use crate::connection::{Connection, INITIAL_LINE_BUFFER_SIZE, StreamOptions};
use crate::utils::StreamError;
use futures_util::{StreamExt, TryStreamExt};
use std::io;
use std::pin::pin;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// How a cycle ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CycleOutcome {
    /// The server closed the body cleanly.
    EndOfStream {
        /// Lines delivered during the cycle.
        delivered: u64,
    },
    /// The stop signal fired; the response, if any, has been dropped.
    Cancelled {
        /// Lines delivered during the cycle.
        delivered: u64,
    },
    /// The message receiver is gone, nobody is left to read lines.
    /// The reconnect loop ends on this outcome.
    ConsumerGone {
        /// Lines delivered during the cycle.
        delivered: u64,
    },
}

/// Runs one cycle against the endpoint described by `connection` and `options`.
///
/// Each await on the network is raced against `stop_signal`, which plays the role
/// of a watcher closing the body: when it fires the response is dropped and the
/// cycle returns [`CycleOutcome::Cancelled`] instead of an error. A slot in
/// `messages` is reserved before each line is read, so the body is only read once
/// the consumer has taken the previous line.
pub(crate) async fn run_cycle(
    connection: &Connection,
    options: &StreamOptions,
    messages: &mpsc::Sender<String>,
    stop_signal: &CancellationToken,
) -> Result<CycleOutcome, StreamError> {
    let request = StreamRequest::new(connection, options)?;
    debug!("Connecting to {}", request.url);

    let response = tokio::select! {
        biased;
        _ = stop_signal.cancelled() => return Ok(CycleOutcome::Cancelled { delivered: 0 }),
        response = request.open() => response?,
    };
    info!("Connected to {}", request.url);

    let body = StreamReader::new(response.bytes_stream().map_err(io::Error::other));
    let mut lines = pin!(FramedRead::with_capacity(
        body,
        FeedLineCodec::new(options.get_max_line_buffer_size()),
        INITIAL_LINE_BUFFER_SIZE.min(options.get_max_line_buffer_size()),
    ));

    let mut delivered: u64 = 0;
    loop {
        // No line is read until the previous one has left the channel.
        let permit = tokio::select! {
            biased;
            _ = stop_signal.cancelled() => return Ok(CycleOutcome::Cancelled { delivered }),
            permit = messages.reserve() => match permit {
                Ok(permit) => permit,
                Err(_) => return Ok(CycleOutcome::ConsumerGone { delivered }),
            },
        };

        let next = tokio::select! {
            biased;
            _ = stop_signal.cancelled() => return Ok(CycleOutcome::Cancelled { delivered }),
            _ = messages.closed() => return Ok(CycleOutcome::ConsumerGone { delivered }),
            next = lines.next() => next,
        };

        let line = match next {
            Some(line) => line?,
            None => return Ok(CycleOutcome::EndOfStream { delivered }),
        };

        permit.send(line);
        delivered += 1;
    }
}
