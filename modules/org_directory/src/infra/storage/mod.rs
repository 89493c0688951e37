pub mod department_repo;
pub mod entity;
pub mod mapper;
pub mod role_department_repo;
pub mod role_repo;

use sea_orm::{DbErr, TransactionError};

use crate::contract::error::DirectoryError;

/// Row chunk size for bulk binding inserts.
pub(crate) const INSERT_CHUNK_SIZE: usize = 100;

/// Logs a storage failure with its cause and degrades it to the opaque
/// internal error before it crosses the contract boundary.
pub(crate) fn storage_error(ctx: &str, err: DbErr) -> DirectoryError {
    tracing::error!("{ctx} failed: {err}");
    DirectoryError::internal()
}

pub(crate) fn tx_error(ctx: &str, err: TransactionError<DbErr>) -> DirectoryError {
    match err {
        TransactionError::Connection(err) | TransactionError::Transaction(err) => {
            storage_error(ctx, err)
        }
    }
}
