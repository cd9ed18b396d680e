//! Stream data operations: push, pull, search, live subscriptions.

use orbit_events::{Handler, SubscriptionHandle};
use orbit_models::{DataQuery, RecordSet, Stream, ValidationError};

use crate::client::OrbitClient;
use crate::error::Result;
use crate::page::Page;
use crate::routes;

/// Telemetry operations on a device's streams.
pub struct StreamClient<'a> {
    client: &'a OrbitClient,
}

fn identity(stream: &Stream) -> Result<(&str, &str)> {
    match stream.device_id.as_deref() {
        Some(device_id) => Ok((device_id, stream.name.as_str())),
        None => Err(ValidationError::MissingDeviceId.into()),
    }
}

impl<'a> StreamClient<'a> {
    pub(crate) fn new(client: &'a OrbitClient) -> Self {
        Self { client }
    }

    /// Push one record to `stream`.
    ///
    /// The record is checked against the stream's declared channels before
    /// anything touches the network. Transient failures retry under the
    /// configured push budget.
    pub async fn push(&self, stream: &Stream, record: &RecordSet) -> Result<()> {
        record.validate(stream)?;
        let (device_id, name) = identity(stream)?;
        let body = serde_json::to_value(record)?;
        self.client
            .put(
                Some(&self.client.config.push_retry),
                &routes::stream(device_id, name),
                body,
            )
            .await?;
        Ok(())
    }

    /// Push a record through its stream back-reference alone.
    ///
    /// No declaration is at hand, so no local validation happens; the
    /// platform is the first to see the record. Same retry budget as
    /// [`StreamClient::push`].
    pub async fn push_unchecked(&self, record: &RecordSet) -> Result<()> {
        let stream = record.stream().ok_or(ValidationError::MissingStreamRef)?;
        let body = serde_json::to_value(record)?;
        self.client
            .put(
                Some(&self.client.config.push_retry),
                &routes::stream(&stream.device_id, &stream.name),
                body,
            )
            .await?;
        Ok(())
    }

    /// Fetch a window of stored records.
    pub async fn pull(
        &self,
        stream: &Stream,
        offset: usize,
        limit: usize,
    ) -> Result<Page<RecordSet>> {
        let (device_id, name) = identity(stream)?;
        let response = self
            .client
            .get(None, &routes::stream_pull(device_id, name, offset, limit))
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// The most recent record of `stream`, when any exists.
    pub async fn last_update(&self, stream: &Stream) -> Result<Option<RecordSet>> {
        let (device_id, name) = identity(stream)?;
        let response = self
            .client
            .get(
                Some(&self.client.config.read_retry),
                &routes::stream_last_update(device_id, name),
            )
            .await?;
        if response.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(response)?))
    }

    /// Search stored records with `query`'s predicates.
    pub async fn search(&self, stream: &Stream, query: &DataQuery) -> Result<Page<RecordSet>> {
        let (device_id, name) = identity(stream)?;
        let body = query.to_json()?;
        let response = self
            .client
            .post(
                Some(&self.client.config.read_retry),
                &routes::stream_search(device_id, name),
                body,
            )
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Drop every record stored for `stream`.
    pub async fn delete(&self, stream: &Stream) -> Result<()> {
        let (device_id, name) = identity(stream)?;
        self.client
            .delete(None, &routes::stream(device_id, name))
            .await?;
        Ok(())
    }

    /// Subscribe to this stream's events.
    pub fn subscribe(&self, stream: &Stream, handler: Handler) -> Result<SubscriptionHandle> {
        Ok(self.client.subscribe(stream.entity_ref()?, handler))
    }
}
