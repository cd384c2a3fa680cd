//! Storage failure classification
//!
//! The only place that knows engine-specific error codes. A raw
//! [`sqlx::Error`] is reduced to a [`Failure`]: either a known
//! [`StorageFault`], an engine code with no table entry, or a failure that
//! carries no engine code at all. Repositories turn a `Failure` into their
//! own per-operation error kinds.

use sqlx::mysql::MySqlDatabaseError;

/// Engine-independent class of a constraint or input failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFault {
    /// A unique index or primary key rejected the write
    UniqueViolation,
    /// A referenced row does not exist
    ForeignKeyViolation,
    /// The store rejected a value as malformed for its column
    InvalidInput,
}

/// Result of classifying a storage error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The engine code maps to a known fault
    Fault(StorageFault),
    /// The engine reported a code this table does not know
    Unmapped(String),
    /// The failure carried no engine code (pool timeout, I/O, decoding)
    NoCode,
}

impl Failure {
    /// The mapped fault, if any
    pub fn fault(&self) -> Option<StorageFault> {
        match self {
            Failure::Fault(fault) => Some(*fault),
            _ => None,
        }
    }
}

/// Engine codes and the fault each one signals.
///
/// SQLite entries are extended result codes; MySQL entries are server error
/// numbers.
const FAULT_CODES: &[(&str, StorageFault)] = &[
    // SQLite
    ("2067", StorageFault::UniqueViolation),     // SQLITE_CONSTRAINT_UNIQUE
    ("1555", StorageFault::UniqueViolation),     // SQLITE_CONSTRAINT_PRIMARYKEY
    ("787", StorageFault::ForeignKeyViolation),  // SQLITE_CONSTRAINT_FOREIGNKEY
    ("275", StorageFault::InvalidInput),         // SQLITE_CONSTRAINT_CHECK
    ("20", StorageFault::InvalidInput),          // SQLITE_MISMATCH
    // MySQL
    ("1062", StorageFault::UniqueViolation),     // ER_DUP_ENTRY
    ("1586", StorageFault::UniqueViolation),     // ER_DUP_ENTRY_WITH_KEY_NAME
    ("1452", StorageFault::ForeignKeyViolation), // ER_NO_REFERENCED_ROW_2
    ("1216", StorageFault::ForeignKeyViolation), // ER_NO_REFERENCED_ROW
    ("1366", StorageFault::InvalidInput),        // ER_TRUNCATED_WRONG_VALUE_FOR_FIELD
    ("1292", StorageFault::InvalidInput),        // ER_TRUNCATED_WRONG_VALUE
    ("3819", StorageFault::InvalidInput),        // ER_CHECK_CONSTRAINT_VIOLATED
];

/// Look up the fault for an engine failure code.
pub fn fault_for_code(code: &str) -> Option<StorageFault> {
    FAULT_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, fault)| *fault)
}

/// Extract the engine failure code from a sqlx error.
///
/// MySQL reports a SQLSTATE through `code()` that is shared by unrelated
/// failures (`23000` covers both duplicates and missing references), so the
/// server error number is used instead.
pub fn failure_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => {
            if let Some(mysql_err) = db_err.try_downcast_ref::<MySqlDatabaseError>() {
                Some(mysql_err.number().to_string())
            } else {
                db_err.code().map(|code| code.into_owned())
            }
        }
        _ => None,
    }
}

/// Classify a sqlx error.
pub fn classify(err: &sqlx::Error) -> Failure {
    match failure_code(err) {
        Some(code) => match fault_for_code(&code) {
            Some(fault) => Failure::Fault(fault),
            None => Failure::Unmapped(code),
        },
        None => Failure::NoCode,
    }
}
