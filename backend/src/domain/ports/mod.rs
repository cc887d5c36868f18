//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod month_reservations_repository;
mod name_source;
mod names_repository;
mod reservation_publisher;

#[cfg(test)]
pub use month_reservations_repository::MockMonthReservationsRepository;
pub use month_reservations_repository::{
    MonthReservationsRepository, MonthReservationsRepositoryError, Revision, StoredMonth,
};
#[cfg(test)]
pub use name_source::MockNameSource;
pub use name_source::{NameSource, NameSourceError};
#[cfg(test)]
pub use names_repository::MockNamesRepository;
pub use names_repository::{FixtureNamesRepository, NamesRepository, NamesRepositoryError};
#[cfg(test)]
pub use reservation_publisher::MockReservationPublisher;
pub use reservation_publisher::{
    PublishReceipt, ReservationPublisher, ReservationPublisherError,
};
