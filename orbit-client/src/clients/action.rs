//! Action operations: invocation and status tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use orbit_events::{Handler, SubscriptionHandle};
use orbit_models::{Action, ValidationError};

use crate::client::OrbitClient;
use crate::error::Result;
use crate::routes;

/// Reported status of an action on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStatus {
    pub action_id: String,
    pub status: String,
    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub reported_at: Option<DateTime<Utc>>,
}

fn identity(action: &Action) -> Result<(&str, &str)> {
    match action.device_id.as_deref() {
        Some(device_id) => Ok((device_id, action.name.as_str())),
        None => Err(ValidationError::MissingDeviceId.into()),
    }
}

/// Invocation and status operations on a device's actions.
pub struct ActionClient<'a> {
    client: &'a OrbitClient,
}

impl<'a> ActionClient<'a> {
    pub(crate) fn new(client: &'a OrbitClient) -> Self {
        Self { client }
    }

    /// Trigger `action` on its device with an arbitrary JSON argument.
    pub async fn invoke(&self, action: &Action, body: Value) -> Result<()> {
        let (device_id, name) = identity(action)?;
        self.client
            .put(None, &routes::action(device_id, name), body)
            .await?;
        Ok(())
    }

    /// The action's current status, when one has been reported.
    pub async fn status(&self, action: &Action) -> Result<Option<ActionStatus>> {
        let (device_id, name) = identity(action)?;
        let response = self
            .client
            .get(None, &routes::action_status(device_id, name))
            .await?;
        if response.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(response)?))
    }

    /// Report a new status for `action`.
    pub async fn set_status(
        &self,
        action: &Action,
        status: impl Into<String>,
    ) -> Result<ActionStatus> {
        let (device_id, name) = identity(action)?;
        let body = serde_json::to_value(ActionStatus {
            action_id: name.to_string(),
            status: status.into(),
            reported_at: None,
        })?;
        let response = self
            .client
            .post(None, &routes::action_status(device_id, name), body)
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Clear the action's stored status.
    pub async fn remove_status(&self, action: &Action) -> Result<()> {
        let (device_id, name) = identity(action)?;
        self.client
            .delete(None, &routes::action_status(device_id, name))
            .await?;
        Ok(())
    }

    /// Subscribe to this action's events.
    pub fn subscribe(&self, action: &Action, handler: Handler) -> Result<SubscriptionHandle> {
        Ok(self.client.subscribe(action.entity_ref()?, handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_status_wire_shape() {
        let status: ActionStatus = serde_json::from_value(serde_json::json!({
            "actionId": "reboot",
            "status": "completed",
            "reportedAt": 1_700_000_000_000_i64
        }))
        .unwrap();
        assert_eq!(status.action_id, "reboot");
        assert_eq!(
            status.reported_at,
            DateTime::from_timestamp_millis(1_700_000_000_000)
        );

        // An unreported timestamp stays off the wire.
        let json = serde_json::to_value(ActionStatus {
            action_id: "reboot".to_string(),
            status: "queued".to_string(),
            reported_at: None,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "actionId": "reboot", "status": "queued" })
        );
    }
}
