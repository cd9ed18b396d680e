//! Observation points for dispatch failures.

use crate::handler::HandlerError;
use crate::registry::SubscriptionKey;

/// Receives the failures the dispatch pipeline swallows.
///
/// Fan-out never lets one subscriber's failure reach another, so errors and
/// panics are reported here instead of propagating. The same goes for feed
/// frames that fail to decode.
pub trait DispatchHook: Send + Sync {
    fn on_handler_error(&self, key: &SubscriptionKey, error: &HandlerError);

    fn on_decode_error(&self, error: &serde_json::Error);
}

/// Default hook: reports failures through `tracing` and moves on.
#[derive(Debug, Default)]
pub struct LogHook;

impl DispatchHook for LogHook {
    fn on_handler_error(&self, key: &SubscriptionKey, error: &HandlerError) {
        tracing::warn!(
            entity_type = %key.entity_type,
            entity_id = %key.entity_id,
            %error,
            "subscriber failed to handle event"
        );
    }

    fn on_decode_error(&self, error: &serde_json::Error) {
        tracing::warn!(%error, "discarding undecodable event frame");
    }
}
