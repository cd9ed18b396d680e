//! Device inventory operations.

use orbit_events::{Handler, SubscriptionHandle};
use orbit_models::{Device, DeviceQuery};

use crate::client::OrbitClient;
use crate::error::{ClientError, Result};
use crate::page::Page;
use crate::routes;

/// CRUD, listing and search over registered devices.
pub struct InventoryClient<'a> {
    client: &'a OrbitClient,
}

impl<'a> InventoryClient<'a> {
    pub(crate) fn new(client: &'a OrbitClient) -> Self {
        Self { client }
    }

    /// Register a new device and return it with its platform-assigned id.
    pub async fn create(&self, device: &Device) -> Result<Device> {
        device.validate()?;
        let body = serde_json::to_value(device)?;
        let response = self.client.post(None, routes::INVENTORY, body).await?;
        let created: Device = serde_json::from_value(response)?;
        if created.id.is_none() {
            return Err(ClientError::IncompleteResponse("id"));
        }
        tracing::debug!(name = %created.name, id = ?created.id, "device registered");
        Ok(created)
    }

    /// Fetch one device by id.
    pub async fn load(&self, device_id: &str) -> Result<Device> {
        let response = self.client.get(None, &routes::device(device_id)).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Replace a registered device's definition.
    pub async fn update(&self, device: &Device) -> Result<Device> {
        let device_id = device.require_id()?;
        device.validate()?;
        let body = serde_json::to_value(device)?;
        let response = self
            .client
            .put(None, &routes::device(device_id), body)
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Unregister a device.
    pub async fn delete(&self, device: &Device) -> Result<()> {
        let device_id = device.require_id()?;
        self.client.delete(None, &routes::device(device_id)).await?;
        Ok(())
    }

    /// List registered devices, one page at a time.
    pub async fn list(&self, page: usize, size: usize) -> Result<Page<Device>> {
        let response = self
            .client
            .get(None, &routes::device_list(page, size))
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Search devices by name and description. An empty query matches all.
    pub async fn search(&self, query: &DeviceQuery) -> Result<Page<Device>> {
        let body = query.to_json()?;
        let response = self
            .client
            .post(None, routes::INVENTORY_SEARCH, body)
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Subscribe to this device's events. Requires a registered device.
    pub fn subscribe(&self, device: &Device, handler: Handler) -> Result<SubscriptionHandle> {
        Ok(self.client.subscribe(device.entity_ref()?, handler))
    }
}
