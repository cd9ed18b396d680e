//! Typed callback adapters.
//!
//! A [`Handler`] wraps a caller-provided closure together with the narrowing
//! rules for its kind. The registry routes frames by entity key; the adapter
//! then decides whether this particular frame is for its closure at all, so
//! a data callback never sees a lifecycle frame even if routing were ever to
//! widen.

use std::fmt;

use orbit_models::{
    ActionEvent, ActionRef, EntityRef, EventOperation, Payload, RecordSet, StreamEvent, StreamRef,
};

/// Error a subscriber may return from its callback.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of one callback invocation.
pub type HandlerResult = Result<(), HandlerError>;

type LifecycleFn = dyn Fn(&EntityRef, &Payload) -> HandlerResult + Send + Sync;
type StreamFn = dyn Fn(&StreamRef, &StreamEvent) -> HandlerResult + Send + Sync;
type DataFn = dyn Fn(&StreamRef, &RecordSet) -> HandlerResult + Send + Sync;
type ActionFn = dyn Fn(&ActionRef, &ActionEvent) -> HandlerResult + Send + Sync;
type RawFn = dyn Fn(&Payload) -> HandlerResult + Send + Sync;

/// A subscriber callback plus the frame shape it accepts.
pub enum Handler {
    /// Create, update and delete frames for the subscribed entity's kind.
    Lifecycle(Box<LifecycleFn>),
    /// Pushed-record frames for a stream, keeping the full event envelope.
    Stream(Box<StreamFn>),
    /// Pushed-record frames for a stream, unwrapped down to the record.
    Data(Box<DataFn>),
    /// Invocation and status frames for an action.
    Action(Box<ActionFn>),
    /// Every frame for the subscribed entity, in wire shape. Subscriptions
    /// naming a stream or action skip sibling frames, like the typed
    /// adapters.
    Raw(Box<RawFn>),
}

impl Handler {
    pub fn lifecycle(
        f: impl Fn(&EntityRef, &Payload) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self::Lifecycle(Box::new(f))
    }

    pub fn stream(
        f: impl Fn(&StreamRef, &StreamEvent) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self::Stream(Box::new(f))
    }

    pub fn data(f: impl Fn(&StreamRef, &RecordSet) -> HandlerResult + Send + Sync + 'static) -> Self {
        Self::Data(Box::new(f))
    }

    pub fn action(
        f: impl Fn(&ActionRef, &ActionEvent) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self::Action(Box::new(f))
    }

    pub fn raw(f: impl Fn(&Payload) -> HandlerResult + Send + Sync + 'static) -> Self {
        Self::Raw(Box::new(f))
    }

    /// Applies this adapter's narrowing to `payload` and invokes the closure
    /// when the frame qualifies. Frames that do not qualify are silently
    /// skipped, which counts as success.
    pub(crate) fn deliver(&self, entity: &EntityRef, payload: &Payload) -> HandlerResult {
        match self {
            Self::Lifecycle(f) => {
                let lifecycle = matches!(
                    payload.operation(),
                    EventOperation::Create | EventOperation::Update | EventOperation::Delete
                );
                if lifecycle
                    && payload.entity_type() == entity.kind()
                    && named_entity_matches(entity, payload)
                {
                    f(entity, payload)
                } else {
                    Ok(())
                }
            }
            Self::Stream(f) => match payload {
                Payload::Stream(ev)
                    if ev.operation == EventOperation::Push
                        && named_entity_matches(entity, payload) =>
                {
                    let stream = StreamRef {
                        device_id: ev.entity_id.clone(),
                        name: ev.stream_id.clone(),
                    };
                    f(&stream, ev)
                }
                _ => Ok(()),
            },
            Self::Data(f) => match payload {
                Payload::Stream(ev)
                    if ev.operation == EventOperation::Push
                        && named_entity_matches(entity, payload) =>
                {
                    match &ev.record {
                        Some(record) => {
                            let stream = StreamRef {
                                device_id: ev.entity_id.clone(),
                                name: ev.stream_id.clone(),
                            };
                            f(&stream, record)
                        }
                        None => Ok(()),
                    }
                }
                _ => Ok(()),
            },
            Self::Action(f) => match payload {
                Payload::Action(ev) if named_entity_matches(entity, payload) => {
                    let action = ActionRef {
                        device_id: ev.entity_id.clone(),
                        name: ev.action_id.clone(),
                    };
                    f(&action, ev)
                }
                _ => Ok(()),
            },
            Self::Raw(f) => {
                if named_entity_matches(entity, payload) {
                    f(payload)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Lifecycle(_) => "Lifecycle",
            Self::Stream(_) => "Stream",
            Self::Data(_) => "Data",
            Self::Action(_) => "Action",
            Self::Raw(_) => "Raw",
        };
        f.debug_tuple("Handler").field(&kind).finish()
    }
}

/// When the subscription names a specific stream or action, the frame must
/// name the same one. Device subscriptions carry no extra name to check.
fn named_entity_matches(entity: &EntityRef, payload: &Payload) -> bool {
    match (entity, payload) {
        (EntityRef::Stream(stream), Payload::Stream(ev)) => stream.name == ev.stream_id,
        (EntityRef::Action(action), Payload::Action(ev)) => action.name == ev.action_id,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use rstest::rstest;

    use orbit_models::{ChannelType, RecordSet, Stream};

    fn counting_data_handler() -> (Handler, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let handler = Handler::data(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (handler, calls)
    }

    fn push_payload(device_id: &str, stream_id: &str) -> Payload {
        let stream = Stream::new(stream_id)
            .channel("temperature", ChannelType::Number)
            .for_device(device_id);
        let record = RecordSet::new(&stream).channel("temperature", 21.5);
        Payload::push(device_id, stream_id, record)
    }

    fn action_payload(device_id: &str, action_id: &str, operation: EventOperation) -> Payload {
        Payload::Action(ActionEvent {
            operation,
            entity_id: device_id.to_string(),
            action_id: action_id.to_string(),
            status: None,
        })
    }

    fn device_payload(device_id: &str, operation: EventOperation) -> Payload {
        Payload::Device(orbit_models::DeviceEvent {
            operation,
            entity_id: device_id.to_string(),
        })
    }

    #[rstest]
    #[case::create(EventOperation::Create, 1)]
    #[case::update(EventOperation::Update, 1)]
    #[case::delete(EventOperation::Delete, 1)]
    #[case::push(EventOperation::Push, 0)]
    fn test_lifecycle_adapter_gates_on_operation(
        #[case] operation: EventOperation,
        #[case] expected_calls: u32,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let handler = Handler::lifecycle(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let entity = EntityRef::device("dev-1");

        handler
            .deliver(&entity, &device_payload("dev-1", operation))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
    }

    #[test]
    fn test_lifecycle_adapter_gates_on_entity_kind() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let handler = Handler::lifecycle(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let entity = EntityRef::device("dev-1");

        // An action frame is a lifecycle-shaped operation on the wrong kind.
        handler
            .deliver(&entity, &action_payload("dev-1", "reboot", EventOperation::Update))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_data_adapter_unwraps_record() {
        let (tx, rx) = std::sync::mpsc::channel();
        let handler = Handler::data(move |stream, record| {
            let _ = tx.send((stream.clone(), record.number("temperature")));
            Ok(())
        });
        let entity = EntityRef::stream("dev-1", "climate");

        handler
            .deliver(&entity, &push_payload("dev-1", "climate"))
            .unwrap();

        let (stream, temperature) = rx.try_recv().unwrap();
        assert_eq!(stream.device_id, "dev-1");
        assert_eq!(stream.name, "climate");
        assert_eq!(temperature, Some(21.5));
    }

    #[test]
    fn test_data_adapter_skips_retagged_frames() {
        let (handler, calls) = counting_data_handler();
        let entity = EntityRef::stream("dev-1", "climate");

        // Same device, action tag: must never reach a data callback.
        handler
            .deliver(&entity, &action_payload("dev-1", "climate", EventOperation::Push))
            .unwrap();
        // Push frame without a record body is likewise skipped.
        handler
            .deliver(
                &entity,
                &Payload::Stream(StreamEvent {
                    operation: EventOperation::Push,
                    entity_id: "dev-1".to_string(),
                    stream_id: "climate".to_string(),
                    record: None,
                }),
            )
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stream_subscription_narrows_to_named_stream() {
        let (handler, calls) = counting_data_handler();
        let entity = EntityRef::stream("dev-1", "climate");

        handler
            .deliver(&entity, &push_payload("dev-1", "power"))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        handler
            .deliver(&entity, &push_payload("dev-1", "climate"))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_action_subscription_narrows_to_named_action() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let handler = Handler::action(move |action, ev| {
            assert_eq!(action.name, ev.action_id);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let entity = EntityRef::action("dev-1", "reboot");

        handler
            .deliver(&entity, &action_payload("dev-1", "calibrate", EventOperation::Invoke))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        handler
            .deliver(&entity, &action_payload("dev-1", "reboot", EventOperation::Invoke))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_raw_adapter_passes_every_frame() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let handler = Handler::raw(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let entity = EntityRef::device("dev-1");

        handler
            .deliver(&entity, &device_payload("dev-1", EventOperation::Create))
            .unwrap();
        handler
            .deliver(&entity, &push_payload("dev-1", "climate"))
            .unwrap();
        handler
            .deliver(&entity, &action_payload("dev-1", "reboot", EventOperation::Invoke))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_raw_adapter_narrows_to_a_named_stream() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let handler = Handler::raw(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let entity = EntityRef::stream("dev-1", "climate");

        // A sibling stream of the same device is not the subscribed entity.
        handler
            .deliver(&entity, &push_payload("dev-1", "power"))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        handler
            .deliver(&entity, &push_payload("dev-1", "climate"))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
