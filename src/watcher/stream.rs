//! Async stream adapter over a running watcher.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::Stream;

use super::{BackendFailure, ChangeHandler};

/// Stream of network change notifications.
///
/// Created by [`Watcher::start_stream`](super::Watcher::start_stream).
///
/// # Stream Items
///
/// - `Ok(())` - A network change occurred
/// - `Err(BackendFailure)` - The backend failed; this is the last item
///
/// The stream ends (`None`) once the watcher is stopped and every
/// notification already delivered has been read.
#[derive(Debug)]
pub struct ChangeStream {
    receiver: mpsc::UnboundedReceiver<Result<(), BackendFailure>>,
    terminated: bool,
}

impl ChangeStream {
    /// Creates a connected handler/stream pair.
    pub(crate) fn channel() -> (ChannelHandler, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            ChannelHandler { sender },
            Self {
                receiver,
                terminated: false,
            },
        )
    }
}

impl Stream for ChangeStream {
    type Item = Result<(), BackendFailure>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.terminated {
            return Poll::Ready(None);
        }

        match Pin::new(&mut self.receiver).poll_recv(cx) {
            Poll::Ready(Some(Err(e))) => {
                self.terminated = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                self.terminated = true;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

/// Handler forwarding notifications into a [`ChangeStream`].
#[derive(Debug)]
pub(crate) struct ChannelHandler {
    sender: mpsc::UnboundedSender<Result<(), BackendFailure>>,
}

impl ChangeHandler for ChannelHandler {
    fn on_change(&self) {
        // Receiver may be dropped; nothing left to notify.
        let _ = self.sender.send(Ok(()));
    }

    fn on_failure(&self, failure: &BackendFailure) {
        tracing::error!("Network change watcher failed: {failure}");
        let _ = self.sender.send(Err(failure.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn yields_one_item_per_change() {
        let (handler, mut stream) = ChangeStream::channel();

        handler.on_change();
        handler.on_change();
        drop(handler);

        assert!(matches!(stream.next().await, Some(Ok(()))));
        assert!(matches!(stream.next().await, Some(Ok(()))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn failure_is_last_item() {
        let (handler, mut stream) = ChangeStream::channel();

        handler.on_failure(&BackendFailure::ChannelClosed);
        handler.on_change();

        assert!(matches!(
            stream.next().await,
            Some(Err(BackendFailure::ChannelClosed))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn ends_when_handler_dropped() {
        let (handler, mut stream) = ChangeStream::channel();
        drop(handler);

        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn send_after_stream_dropped_is_ignored() {
        let (handler, stream) = ChangeStream::channel();
        drop(stream);

        handler.on_change();
        handler.on_failure(&BackendFailure::ChannelClosed);
    }

    #[test]
    fn stream_is_send_and_unpin() {
        fn assert_send<T: Send>() {}
        fn assert_unpin<T: Unpin>() {}
        assert_send::<ChangeStream>();
        assert_unpin::<ChangeStream>();
    }
}
