//! Pending offers and active bookings for one provider.
//!
//! Local accept/reject only ever touch the pending list. The active list
//! is filled exclusively from a server refetch.

use tracing::debug;

use sb_models::{Booking, BookingOffer, BookingStatus, OfferStatus};

/// The provider's two lists: offers awaiting an answer, and bookings the
/// server considers accepted or confirmed.
#[derive(Debug, Clone, Default)]
pub struct OfferBoard {
    pending: Vec<BookingOffer>,
    active: Vec<BookingOffer>,
}

impl OfferBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers awaiting an answer, newest first.
    pub fn pending(&self) -> &[BookingOffer] {
        &self.pending
    }

    /// Accepted or confirmed bookings as of the last refetch.
    pub fn active(&self) -> &[BookingOffer] {
        &self.active
    }

    pub fn find_pending(&self, id: i64) -> Option<&BookingOffer> {
        self.pending.iter().find(|o| o.id == id)
    }

    /// Add a newly pushed offer at the front. A repeated push for the
    /// same id replaces the earlier entry.
    ///
    /// Returns false, leaving the board untouched, when the id is already
    /// active.
    pub fn on_request(&mut self, mut offer: BookingOffer) -> bool {
        if self.active.iter().any(|o| o.id == offer.id) {
            debug!("offer {} already active, ignoring request", offer.id);
            return false;
        }
        offer.status = OfferStatus::Notified;
        self.take_pending(offer.id);
        debug!("offer {} pending", offer.id);
        self.pending.insert(0, offer);
        true
    }

    /// Mark an offer as provisionally accepted. It stays pending until
    /// the server confirms or closes it.
    pub fn mark_accepted(&mut self, id: i64) -> bool {
        match self.pending.iter_mut().find(|o| o.id == id) {
            Some(offer) => {
                offer.status = OfferStatus::Accepted;
                true
            }
            None => false,
        }
    }

    /// Drop an offer the provider declined.
    pub fn reject(&mut self, id: i64) -> Option<BookingOffer> {
        self.take_pending(id).map(|mut offer| {
            offer.status = OfferStatus::Rejected;
            offer
        })
    }

    /// The server confirmed this provider for the booking.
    pub fn on_confirmed(&mut self, id: i64) -> Option<BookingOffer> {
        self.take_pending(id)
    }

    /// The booking went elsewhere or was withdrawn.
    pub fn on_closed(&mut self, id: i64) -> Option<BookingOffer> {
        self.take_pending(id).map(|mut offer| {
            offer.status = OfferStatus::Closed;
            offer
        })
    }

    /// Rebuild both lists from the server's provider bookings.
    ///
    /// `notified` records become pending, `accepted` and `confirmed`
    /// records become active, everything else is dropped.
    pub fn replace_from_server(&mut self, bookings: &[Booking]) {
        self.pending = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Notified)
            .map(BookingOffer::from_booking)
            .collect();
        self.active = bookings
            .iter()
            .filter(|b| b.status.is_active())
            .map(BookingOffer::from_booking)
            .collect();
        debug!(
            "board replaced: {} pending, {} active",
            self.pending.len(),
            self.active.len()
        );
    }

    fn take_pending(&mut self, id: i64) -> Option<BookingOffer> {
        let idx = self.pending.iter().position(|o| o.id == id)?;
        Some(self.pending.remove(idx))
    }
}
