//! Provider availability and slot lookup endpoints.

use sb_core::error::SbResult;
use sb_models::{Availability, SlotAvailability, SlotQuery};

use crate::client::{to_body, ApiClient};

impl ApiClient {
    /// The signed-in provider's weekly availability.
    pub async fn provider_availability(&self) -> SbResult<Availability> {
        self.get_json("/accounts/provider/availability/").await
    }

    /// Replace the signed-in provider's weekly availability.
    pub async fn update_provider_availability(
        &self,
        availability: &Availability,
    ) -> SbResult<Availability> {
        self.put_json("/accounts/provider/availability/", &to_body(availability)?)
            .await
    }

    /// Providers free for a service at a given date and time.
    pub async fn available_slots(&self, query: &SlotQuery) -> SbResult<SlotAvailability> {
        self.post_json("/accounts/available-slots/", &to_body(query)?)
            .await
    }
}
