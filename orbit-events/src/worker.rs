//! Background task bridging the raw event feed to the dispatcher.

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use orbit_models::Payload;

use crate::registry::Dispatcher;

/// Raw frames from the platform's event feed. Each item is one complete
/// JSON-encoded payload.
pub type EventStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// Owns the task that decodes feed frames and hands them to a [`Dispatcher`].
///
/// The worker runs until it is shut down or the feed ends. Dropping it
/// signals shutdown without waiting; [`DispatchWorker::shutdown`] waits for
/// the task to wind down.
#[derive(Debug)]
pub struct DispatchWorker {
    handle: Option<JoinHandle<()>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl DispatchWorker {
    /// Spawn the dispatch loop on the current runtime.
    pub fn spawn(events: EventStream, dispatcher: Arc<Dispatcher>) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run(events, dispatcher, shutdown_rx));
        Self {
            handle: Some(handle),
            shutdown: Some(shutdown_tx),
        }
    }

    /// Stop the worker and wait for in-flight dispatch to finish.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for DispatchWorker {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn run(
    mut events: EventStream,
    dispatcher: Arc<Dispatcher>,
    mut shutdown: oneshot::Receiver<()>,
) {
    tracing::info!("event dispatch worker started");

    loop {
        tokio::select! {
            // Shutdown wins over buffered frames.
            biased;

            _ = &mut shutdown => {
                break;
            }
            frame = events.next() => {
                match frame {
                    Some(frame) => handle_frame(&dispatcher, &frame),
                    None => {
                        tracing::info!("event feed closed");
                        break;
                    }
                }
            }
        }
    }

    tracing::info!("event dispatch worker stopped");
}

fn handle_frame(dispatcher: &Dispatcher, frame: &[u8]) {
    match serde_json::from_slice::<Payload>(frame) {
        Ok(payload) => dispatcher.dispatch(&payload),
        Err(error) => dispatcher.hook.on_decode_error(&error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use futures::channel::mpsc;

    use orbit_models::{ChannelType, EntityRef, RecordSet, Stream};

    use crate::handler::Handler;
    use crate::hook::DispatchHook;
    use crate::registry::SubscriptionKey;

    fn feed() -> (mpsc::UnboundedSender<Bytes>, EventStream) {
        let (tx, rx) = mpsc::unbounded();
        (tx, Box::pin(rx))
    }

    fn push_frame(device_id: &str, stream_id: &str, temperature: f64) -> Bytes {
        let stream = Stream::new(stream_id)
            .channel("temperature", ChannelType::Number)
            .for_device(device_id);
        let record = RecordSet::new(&stream).channel("temperature", temperature);
        let payload = Payload::push(device_id, stream_id, record);
        Bytes::from(serde_json::to_vec(&payload).unwrap())
    }

    #[derive(Default)]
    struct CountingHook {
        decode_errors: AtomicU32,
    }

    impl DispatchHook for CountingHook {
        fn on_handler_error(&self, _key: &SubscriptionKey, _error: &crate::HandlerError) {}

        fn on_decode_error(&self, _error: &serde_json::Error) {
            self.decode_errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_worker_routes_frames_to_subscribers() {
        let dispatcher = Arc::new(Dispatcher::new());
        let (record_tx, mut record_rx) = tokio::sync::mpsc::unbounded_channel();
        dispatcher.subscribe(
            EntityRef::stream("dev-1", "climate"),
            Handler::data(move |_, record| {
                let _ = record_tx.send(record.number("temperature"));
                Ok(())
            }),
        );

        let (tx, events) = feed();
        let worker = DispatchWorker::spawn(events, dispatcher);

        tx.unbounded_send(push_frame("dev-1", "climate", 21.5)).unwrap();

        let delivered = tokio::time::timeout(Duration::from_secs(1), record_rx.recv())
            .await
            .unwrap();
        assert_eq!(delivered, Some(Some(21.5)));

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn test_worker_survives_undecodable_frames() {
        let hook = Arc::new(CountingHook::default());
        let dispatcher = Arc::new(Dispatcher::with_hook(hook.clone()));
        let (record_tx, mut record_rx) = tokio::sync::mpsc::unbounded_channel();
        dispatcher.subscribe(
            EntityRef::stream("dev-1", "climate"),
            Handler::data(move |_, record| {
                let _ = record_tx.send(record.number("temperature"));
                Ok(())
            }),
        );

        let (tx, events) = feed();
        let worker = DispatchWorker::spawn(events, dispatcher);

        tx.unbounded_send(Bytes::from_static(b"not json")).unwrap();
        tx.unbounded_send(push_frame("dev-1", "climate", 7.0)).unwrap();

        let delivered = tokio::time::timeout(Duration::from_secs(1), record_rx.recv())
            .await
            .unwrap();
        assert_eq!(delivered, Some(Some(7.0)));
        assert_eq!(hook.decode_errors.load(Ordering::SeqCst), 1);

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drops_the_feed() {
        let dispatcher = Arc::new(Dispatcher::new());
        let (tx, events) = feed();
        let worker = DispatchWorker::spawn(events, dispatcher);

        worker.shutdown().await;
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_shutdown_skips_buffered_frames() {
        let dispatcher = Arc::new(Dispatcher::new());
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        dispatcher.subscribe(
            EntityRef::stream("dev-1", "climate"),
            Handler::data(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        let (tx, events) = feed();
        let worker = DispatchWorker::spawn(events, dispatcher);

        // On this single-threaded runtime the worker first runs once
        // shutdown() awaits it, with these frames already queued behind
        // the signal.
        tx.unbounded_send(push_frame("dev-1", "climate", 1.0)).unwrap();
        tx.unbounded_send(push_frame("dev-1", "climate", 2.0)).unwrap();
        worker.shutdown().await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_worker_exits_when_feed_ends() {
        let dispatcher = Arc::new(Dispatcher::new());
        let (tx, events) = feed();
        let worker = DispatchWorker::spawn(events, dispatcher);

        drop(tx);
        // Must complete rather than hang on a worker that never noticed.
        worker.shutdown().await;
    }
}
