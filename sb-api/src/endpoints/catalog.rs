//! Service catalog endpoints.

use sb_core::error::SbResult;
use sb_models::{ServiceCategory, ServiceItem};

use crate::client::ApiClient;

impl ApiClient {
    pub async fn service_categories(&self) -> SbResult<Vec<ServiceCategory>> {
        self.get_list("/services/categories/").await
    }

    /// Services within one category.
    pub async fn category_services(&self, category_id: i64) -> SbResult<Vec<ServiceItem>> {
        self.get_list(&format!("/services/category/{category_id}/")).await
    }
}
