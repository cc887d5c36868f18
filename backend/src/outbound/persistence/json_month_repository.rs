//! File-backed month repository: one `reservations-YYYY-MM.json` per month.

use tracing::debug;

use crate::domain::ports::{
    MonthReservationsRepository, MonthReservationsRepositoryError, Revision, StoredMonth,
};
use crate::domain::{MonthKey, MonthReservations};

use super::DataDir;
use super::month_document::{decode, encode};
use super::revision::revision_of;

/// File name holding the blob for `month`.
#[must_use]
pub fn month_file_name(month: MonthKey) -> String {
    format!("reservations-{}.json", month.storage_key())
}

/// Month repository storing JSON blobs in a [`DataDir`].
#[derive(Debug, Clone)]
pub struct JsonFileMonthRepository {
    data: DataDir,
}

impl JsonFileMonthRepository {
    /// Repository over `data`.
    #[must_use]
    pub const fn new(data: DataDir) -> Self {
        Self { data }
    }
}

impl MonthReservationsRepository for JsonFileMonthRepository {
    fn load(&self, month: MonthKey) -> StoredMonth {
        let name = month_file_name(month);
        let Some(raw) = self.data.read(&name) else {
            debug!(file = %name, "no stored reservations");
            return StoredMonth::absent(month);
        };
        StoredMonth {
            reservations: decode(month, &raw),
            revision: Some(revision_of(&raw)),
        }
    }

    fn flush(
        &self,
        reservations: &MonthReservations,
    ) -> Result<Revision, MonthReservationsRepositoryError> {
        let month = reservations.month();
        let encoded = encode(reservations).map_err(|err| {
            MonthReservationsRepositoryError::encode(month.storage_key(), err.to_string())
        })?;
        self.data
            .write(&month_file_name(month), &encoded)
            .map_err(|err| {
                MonthReservationsRepositoryError::write(month.storage_key(), err.to_string())
            })?;
        Ok(revision_of(&encoded))
    }

    fn current_revision(&self, month: MonthKey) -> Option<Revision> {
        self.data
            .read(&month_file_name(month))
            .map(|raw| revision_of(&raw))
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{Choice, LunchSlot, PersonId};

    #[fixture]
    fn repo() -> (TempDir, JsonFileMonthRepository) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 path");
        let data = DataDir::open(&root).expect("data dir");
        (temp, JsonFileMonthRepository::new(data))
    }

    fn december() -> MonthKey {
        MonthKey::from_ym(2025, 12).expect("valid month")
    }

    #[rstest]
    fn absent_month_has_no_revision(repo: (TempDir, JsonFileMonthRepository)) {
        let (_temp, repository) = repo;
        let stored = repository.load(december());
        assert!(stored.reservations.is_empty());
        assert!(stored.revision.is_none());
        assert!(repository.current_revision(december()).is_none());
    }

    #[rstest]
    fn flush_then_load_agree_on_revision(repo: (TempDir, JsonFileMonthRepository)) {
        let (_temp, repository) = repo;
        let mut reservations = MonthReservations::new(december());
        reservations
            .insert(
                NaiveDate::from_ymd_opt(2025, 12, 2).expect("valid date"),
                &PersonId::new("p1").expect("valid id"),
                Choice {
                    vegetarian: true,
                    slot: LunchSlot::Slot1145,
                },
            )
            .expect("bookable");

        let written = repository.flush(&reservations).expect("flushed");
        let stored = repository.load(december());

        assert_eq!(stored.reservations, reservations);
        assert_eq!(stored.revision.as_ref(), Some(&written));
        assert_eq!(repository.current_revision(december()), Some(written));
    }

    #[test]
    fn file_names_embed_the_month() {
        assert_eq!(month_file_name(december()), "reservations-2025-12.json");
    }
}
