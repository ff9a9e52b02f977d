use redb::TableDefinition;

/// Subscription records: auto-incrementing id -> Subscription (msgpack)
pub const SUBSCRIPTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("subscriptions");
