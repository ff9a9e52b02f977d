use chrono::{DateTime, Utc};
use redb::{ReadableTable, ReadableTableMetadata};

use super::db::{Database, DatabaseError};
use super::models::{NewSubscription, Subscription};
use super::tables::*;

impl Database {
    // ========================================================================
    // Subscription operations
    // ========================================================================

    /// Append a subscription record, assigning the next id inside the write transaction.
    pub fn create_subscription(
        &self,
        new: NewSubscription,
        created_at: DateTime<Utc>,
    ) -> Result<Subscription, DatabaseError> {
        debug_assert!(
            !new.screenshot_reference.is_empty(),
            "screenshot reference must not be empty"
        );

        let write_txn = self.begin_write()?;
        let subscription = {
            let mut table = write_txn.open_table(SUBSCRIPTIONS)?;
            let id = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 1,
            };

            let subscription = Subscription {
                id,
                name: new.name,
                telegram_handle: new.telegram_handle,
                instagram_handle: new.instagram_handle,
                phone: new.phone,
                screenshot_reference: new.screenshot_reference,
                created_at,
            };

            let data = rmp_serde::to_vec_named(&subscription)?;
            table.insert(id, data.as_slice())?;
            subscription
        };
        write_txn.commit()?;

        Ok(subscription)
    }

    /// Get a subscription by id
    pub fn get_subscription(&self, id: u64) -> Result<Option<Subscription>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SUBSCRIPTIONS)?;

        match table.get(id)? {
            Some(data) => {
                let subscription: Subscription = rmp_serde::from_slice(data.value())?;
                Ok(Some(subscription))
            }
            None => Ok(None),
        }
    }

    /// All subscriptions in creation order
    pub fn list_subscriptions(&self) -> Result<Vec<Subscription>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SUBSCRIPTIONS)?;

        let mut subscriptions = Vec::new();
        for entry in table.iter()? {
            let (_, data) = entry?;
            subscriptions.push(rmp_serde::from_slice(data.value())?);
        }

        Ok(subscriptions)
    }

    pub fn count_subscriptions(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SUBSCRIPTIONS)?;
        Ok(table.len()?)
    }
}
