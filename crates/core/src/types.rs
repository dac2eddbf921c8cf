/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Credit amounts are signed 64-bit integers. Ledger entries are signed
/// (debits negative, credits positive); balances are never negative.
pub type CreditAmount = i64;
