/// All remote primary keys are integer ids.
pub type DbId = i64;

/// All client-side instants are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
