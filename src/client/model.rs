/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

use crate::utils::StreamError;
use tokio::sync::mpsc;

/// Represents the current status of the `StreamClient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    /// Not started, or stopped.
    Idle,
    /// Between a successful `start` and the next successful `stop`.
    Running,
}

/// One event received from a `StreamClient`.
#[derive(Debug)]
pub enum StreamEvent {
    /// A raw line of the feed.
    Message(String),
    /// A cycle failed; the client reconnects after the reconnect delay.
    Error(StreamError),
    /// The loop started by the last `start` has finished.
    Stopped,
}

/// Receiving ends of the three event channels of a `StreamClient`.
///
/// The channels are created together with the client and live as long as it does;
/// `start` and `stop` never replace them. Every channel holds at most one pending
/// event, so a consumer that stops reading also stops the network reader.
///
/// When reading the receivers directly rather than through [`next`](Self::next),
/// drain `messages` before acting on `errors` or `stopped`: the last line of a
/// cycle may still sit in its channel when the cycle's error or the stop
/// confirmation is already available.
#[derive(Debug)]
pub struct StreamEvents {
    /// Feed lines, in the order received from the network.
    pub messages: mpsc::Receiver<String>,
    /// Non-fatal errors, one per failed cycle.
    pub errors: mpsc::Receiver<StreamError>,
    /// One confirmation per successful `stop`.
    pub stopped: mpsc::Receiver<()>,
}

impl StreamEvents {
    /// Waits for the next event of any kind.
    ///
    /// Pending messages are returned before pending errors, and both before a stop
    /// confirmation, so once [`StreamEvent::Stopped`] is returned every line of the
    /// stopped loop has already been handed out. Returns `None` once every sender is
    /// gone.
    ///
    /// This method is cancel safe.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        tokio::select! {
            biased;
            Some(message) = self.messages.recv() => Some(StreamEvent::Message(message)),
            Some(error) = self.errors.recv() => Some(StreamEvent::Error(error)),
            Some(()) = self.stopped.recv() => Some(StreamEvent::Stopped),
            else => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> (
        mpsc::Sender<String>,
        mpsc::Sender<StreamError>,
        mpsc::Sender<()>,
        StreamEvents,
    ) {
        let (message_sender, messages) = mpsc::channel(1);
        let (error_sender, errors) = mpsc::channel(1);
        let (stop_sender, stopped) = mpsc::channel(1);
        (
            message_sender,
            error_sender,
            stop_sender,
            StreamEvents {
                messages,
                errors,
                stopped,
            },
        )
    }

    #[tokio::test]
    async fn test_next_prefers_messages() {
        let (message_sender, error_sender, stop_sender, mut events) = events();
        stop_sender.send(()).await.unwrap();
        error_sender
            .send(StreamError::InvalidStatus(500))
            .await
            .unwrap();
        message_sender.send("line".to_string()).await.unwrap();

        assert!(matches!(events.next().await, Some(StreamEvent::Message(m)) if m == "line"));
        assert!(matches!(
            events.next().await,
            Some(StreamEvent::Error(StreamError::InvalidStatus(500)))
        ));
        assert!(matches!(events.next().await, Some(StreamEvent::Stopped)));
    }

    #[tokio::test]
    async fn test_next_returns_none_when_senders_dropped() {
        let (message_sender, error_sender, stop_sender, mut events) = events();
        drop(message_sender);
        drop(error_sender);
        drop(stop_sender);
        assert!(events.next().await.is_none());
    }
}
