use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DbBackend, SqlErr, Statement};

use crate::engine::codes::{self, CodePrefix};
use crate::engine::EngineError;
use crate::error::{AppError, AppResult};

/// Reserve the next day-scoped number for `prefix` and render the code.
///
/// The upsert serializes concurrent callers on the counter row inside the
/// enclosing transaction, so reserved codes are collision-free by
/// construction. The unique index on the document code column remains as a
/// backstop; see `duplicate_code_err`.
pub(crate) async fn reserve_code<C: ConnectionTrait>(
    conn: &C,
    prefix: CodePrefix,
    date: NaiveDate,
) -> AppResult<String> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO code_sequences (prefix, seq_date, last_number)
            VALUES ($1, $2, 1)
            ON CONFLICT (prefix, seq_date)
            DO UPDATE SET last_number = code_sequences.last_number + 1
            RETURNING last_number
            "#,
            [prefix.as_str().into(), date.into()],
        ))
        .await?
        .ok_or_else(|| anyhow::anyhow!("code sequence upsert returned no row"))?;

    let number: i64 = row.try_get("", "last_number")?;
    Ok(codes::format_code(prefix, date, number))
}

/// Map a unique-violation on a document code column to `DuplicateCode` so
/// the caller can retry with a fresh number; pass every other error through.
pub(crate) fn duplicate_code_err(err: sea_orm::DbErr, code: &str) -> AppError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        AppError::Engine(EngineError::DuplicateCode {
            code: code.to_string(),
        })
    } else {
        AppError::OrmError(err)
    }
}
