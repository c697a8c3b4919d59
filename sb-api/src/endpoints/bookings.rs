//! Booking endpoints.

use sb_core::error::SbResult;
use sb_models::{Booking, BookingRequest, BookingRequestReceipt, ReviewSubmission};

use crate::client::{to_body, ApiClient};

impl ApiClient {
    /// Bookings assigned to or offered to the signed-in provider.
    pub async fn provider_bookings(&self) -> SbResult<Vec<Booking>> {
        self.get_list("/bookings/provider/").await
    }

    /// Bookings made by the signed-in customer.
    pub async fn customer_bookings(&self) -> SbResult<Vec<Booking>> {
        self.get_list("/bookings/").await
    }

    /// Request a booking; the backend fans it out to nearby providers.
    pub async fn request_booking(&self, request: &BookingRequest) -> SbResult<BookingRequestReceipt> {
        self.post_json("/bookings/request/", &to_body(request)?).await
    }

    /// Submit a rating and feedback for a finished booking.
    pub async fn review_booking(&self, booking_id: i64, review: &ReviewSubmission) -> SbResult<()> {
        self.post(&format!("/admin/bookings/{booking_id}/review/"), &to_body(review)?)
            .await?;
        Ok(())
    }
}
