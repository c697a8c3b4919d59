//! Complaint endpoints for customers.

use sb_core::error::SbResult;
use sb_models::{Complaint, NewComplaint};

use crate::client::{to_body, ApiClient};

impl ApiClient {
    pub async fn complaints(&self) -> SbResult<Vec<Complaint>> {
        self.get_list("/complaints/").await
    }

    pub async fn file_complaint(&self, complaint: &NewComplaint) -> SbResult<Complaint> {
        self.post_json("/complaints/", &to_body(complaint)?).await
    }
}
