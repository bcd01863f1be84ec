/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("pattern refused at admission gate: {reason}")]
    AdmissionRefused { reason: String },

    #[error("lead {lead_id} already has a credited conversion")]
    ConversionAlreadyCredited { lead_id: String },

    #[error("unknown scope key: {key}")]
    UnknownScopeKey { key: String },
}
