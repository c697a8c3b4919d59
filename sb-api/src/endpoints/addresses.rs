//! Saved address endpoints.

use sb_core::error::SbResult;
use sb_models::Address;

use crate::client::{to_body, ApiClient};

impl ApiClient {
    pub async fn addresses(&self) -> SbResult<Vec<Address>> {
        self.get_list("/addresses/").await
    }

    pub async fn create_address(&self, address: &Address) -> SbResult<Address> {
        self.post_json("/addresses/", &to_body(address)?).await
    }

    /// Partially update an address; `changes` is sent as-is.
    pub async fn update_address(&self, id: i64, changes: &serde_json::Value) -> SbResult<Address> {
        self.patch_json(&format!("/addresses/{id}/"), changes).await
    }

    pub async fn delete_address(&self, id: i64) -> SbResult<()> {
        self.delete(&format!("/addresses/{id}/")).await
    }
}
