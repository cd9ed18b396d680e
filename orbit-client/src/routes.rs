//! Route construction for the platform's HTTP surface.

pub(crate) const INVENTORY: &str = "/inventory";
pub(crate) const INVENTORY_SEARCH: &str = "/inventory/search";

pub(crate) fn device(device_id: &str) -> String {
    format!("/inventory/{device_id}")
}

pub(crate) fn device_list(page: usize, size: usize) -> String {
    format!("/inventory?page={page}&size={size}")
}

pub(crate) fn stream(device_id: &str, stream: &str) -> String {
    format!("/stream/{device_id}/{stream}")
}

pub(crate) fn stream_pull(device_id: &str, stream: &str, offset: usize, limit: usize) -> String {
    format!("/stream/{device_id}/{stream}?offset={offset}&limit={limit}")
}

pub(crate) fn stream_last_update(device_id: &str, stream: &str) -> String {
    format!("/stream/{device_id}/{stream}/lastUpdate")
}

pub(crate) fn stream_search(device_id: &str, stream: &str) -> String {
    format!("/stream/{device_id}/{stream}/search")
}

pub(crate) fn action(device_id: &str, action: &str) -> String {
    format!("/actions/{device_id}/{action}")
}

pub(crate) fn action_status(device_id: &str, action: &str) -> String {
    format!("/actions/{device_id}/{action}/status")
}
