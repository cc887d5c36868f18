//! Driven port for optional remote write-back of a month blob.
//!
//! Publishing sits outside the engine contract: it runs only after a
//! successful local flush, on explicit request, and its failure never rolls
//! back the local save.

use async_trait::async_trait;

use crate::domain::MonthReservations;

use super::define_port_error;

/// Acknowledgement returned by a publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Remote location the blob was written to.
    pub location: String,
    /// Remote version identifier, when the target reports one.
    pub version: Option<String>,
}

define_port_error! {
    /// Errors surfaced while publishing reservations.
    pub enum ReservationPublisherError {
        /// Publishing is not configured.
        NotConfigured { message: String } =>
            "publisher not configured: {message}",
        /// Network transport failed.
        Transport { message: String } =>
            "publisher transport failed: {message}",
        /// The remote rejected the write.
        Rejected { status: u16, message: String } =>
            "publisher rejected write ({status}): {message}",
        /// The blob could not be encoded.
        Encode { message: String } =>
            "publisher could not encode reservations: {message}",
    }
}

/// Pushes a serialised month blob to a remote host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationPublisher: Send + Sync {
    /// Publish the full month blob, replacing any remote copy.
    async fn publish(
        &self,
        reservations: &MonthReservations,
    ) -> Result<PublishReceipt, ReservationPublisherError>;
}
