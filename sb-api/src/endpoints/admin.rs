//! Administrator endpoints.
//!
//! Account collections (users, providers, customers, admins, materials)
//! share the same list/get/patch/delete shape under
//! `/admin/accounts/<collection>/`, so those go through one set of
//! generic helpers keyed by `AdminCollection`.

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::info;

use sb_core::error::SbResult;
use sb_models::{
    AdminProfile, AuditLog, AuditLogFilter, Booking, BookingStatus, BookingUpdate, Complaint,
    ComplaintStatus, CustomerProfile, Material, Notification, ProviderProfile, User,
};

use crate::client::{to_body, ApiClient};

/// A resource collection under `/admin/accounts/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCollection {
    Users,
    Providers,
    Customers,
    Admins,
    Materials,
}

impl AdminCollection {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Users => "/admin/accounts/users/",
            Self::Providers => "/admin/accounts/providers/",
            Self::Customers => "/admin/accounts/customers/",
            Self::Admins => "/admin/accounts/admins/",
            Self::Materials => "/admin/accounts/materials/",
        }
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}{id}/", self.path())
    }
}

const ADMIN_BOOKINGS: &str = "/admin/bookings/bookings/";
const ADMIN_COMPLAINTS: &str = "/admin/reviews/complaints/";
const ADMIN_AUDIT_LOGS: &str = "/admin/accounts/auditlogs/";
const ADMIN_NOTIFICATIONS: &str = "/admin/accounts/notifications/";

impl ApiClient {
    // --- Generic collection access ---

    pub async fn admin_list<T: DeserializeOwned>(&self, collection: AdminCollection) -> SbResult<Vec<T>> {
        self.get_list(collection.path()).await
    }

    pub async fn admin_get<T: DeserializeOwned>(
        &self,
        collection: AdminCollection,
        id: i64,
    ) -> SbResult<T> {
        self.get_json(&collection.item_path(id)).await
    }

    pub async fn admin_patch<T: DeserializeOwned>(
        &self,
        collection: AdminCollection,
        id: i64,
        changes: &serde_json::Value,
    ) -> SbResult<T> {
        self.patch_json(&collection.item_path(id), changes).await
    }

    pub async fn admin_delete(&self, collection: AdminCollection, id: i64) -> SbResult<()> {
        self.delete(&collection.item_path(id)).await?;
        info!("deleted {:?} {}", collection, id);
        Ok(())
    }

    // --- Typed shortcuts ---

    pub async fn admin_users(&self) -> SbResult<Vec<User>> {
        self.admin_list(AdminCollection::Users).await
    }

    pub async fn admin_providers(&self) -> SbResult<Vec<ProviderProfile>> {
        self.admin_list(AdminCollection::Providers).await
    }

    pub async fn admin_customers(&self) -> SbResult<Vec<CustomerProfile>> {
        self.admin_list(AdminCollection::Customers).await
    }

    pub async fn admin_admins(&self) -> SbResult<Vec<AdminProfile>> {
        self.admin_list(AdminCollection::Admins).await
    }

    /// Create an administrator account.
    pub async fn create_admin(&self, profile: &serde_json::Value) -> SbResult<AdminProfile> {
        self.post_json(AdminCollection::Admins.path(), profile).await
    }

    pub async fn materials(&self) -> SbResult<Vec<Material>> {
        self.admin_list(AdminCollection::Materials).await
    }

    pub async fn create_material(&self, material: &Material) -> SbResult<Material> {
        self.post_json(AdminCollection::Materials.path(), &to_body(material)?)
            .await
    }

    /// Replace a material record.
    pub async fn update_material(&self, id: i64, material: &Material) -> SbResult<Material> {
        self.put_json(&AdminCollection::Materials.item_path(id), &to_body(material)?)
            .await
    }

    // --- Bookings ---

    pub async fn admin_bookings(&self) -> SbResult<Vec<Booking>> {
        self.get_list(ADMIN_BOOKINGS).await
    }

    pub async fn admin_update_booking(&self, id: i64, update: &BookingUpdate) -> SbResult<Booking> {
        self.patch_json(&format!("{ADMIN_BOOKINGS}{id}/"), &to_body(update)?)
            .await
    }

    /// Cancel a booking on the customer's behalf.
    pub async fn admin_cancel_booking(&self, id: i64) -> SbResult<Booking> {
        let update = BookingUpdate {
            status: Some(BookingStatus::Cancelled),
            ..Default::default()
        };
        self.admin_update_booking(id, &update).await
    }

    // --- Complaints ---

    pub async fn admin_complaints(&self) -> SbResult<Vec<Complaint>> {
        self.get_list(ADMIN_COMPLAINTS).await
    }

    /// Set a complaint's status, with an optional note for the customer.
    pub async fn admin_set_complaint_status(
        &self,
        id: i64,
        status: ComplaintStatus,
        admin_note: Option<&str>,
    ) -> SbResult<Complaint> {
        let mut body = json!({ "status": status });
        if let Some(note) = admin_note {
            body["admin_note"] = json!(note);
        }
        self.patch_json(&format!("{ADMIN_COMPLAINTS}{id}/"), &body).await
    }

    // --- Audit trail and notifications ---

    pub async fn audit_logs(&self, filter: &AuditLogFilter) -> SbResult<Vec<AuditLog>> {
        self.get_list_with_query(ADMIN_AUDIT_LOGS, &filter.to_query())
            .await
    }

    /// Unread notifications, newest first.
    pub async fn unread_notifications(&self) -> SbResult<Vec<Notification>> {
        self.get_list_with_query(
            ADMIN_NOTIFICATIONS,
            &[("ordering", "-timestamp"), ("read", "false")],
        )
        .await
    }

    pub async fn mark_notification_read(&self, id: i64) -> SbResult<()> {
        self.patch(&format!("{ADMIN_NOTIFICATIONS}{id}/"), &json!({ "read": true }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_paths() {
        assert_eq!(AdminCollection::Providers.path(), "/admin/accounts/providers/");
        assert_eq!(
            AdminCollection::Materials.item_path(3),
            "/admin/accounts/materials/3/"
        );
    }
}
