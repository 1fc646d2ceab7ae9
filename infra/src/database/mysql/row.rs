//! Column decoding helpers shared by the MySQL repositories.
//!
//! Identifiers are stored as `CHAR(36)` and enums as their canonical strings,
//! so most columns need a parse step on the way out.

use std::str::FromStr;

use salon_core::errors::DomainError;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Row};
use uuid::Uuid;

use crate::InfrastructureError;

/// Map a driver error into the domain's internal error
pub(crate) fn db_err(e: sqlx::Error) -> DomainError {
    InfrastructureError::Database(e).into()
}

pub(crate) fn get<'r, T>(row: &'r MySqlRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(column).map_err(db_err)
}

pub(crate) fn get_uuid(row: &MySqlRow, column: &str) -> Result<Uuid, DomainError> {
    let raw: String = get(row, column)?;
    parse_uuid(column, &raw)
}

pub(crate) fn get_opt_uuid(row: &MySqlRow, column: &str) -> Result<Option<Uuid>, DomainError> {
    let raw: Option<String> = get(row, column)?;
    raw.map(|raw| parse_uuid(column, &raw)).transpose()
}

/// Decode a string column into an enum with a `FromStr` impl
pub(crate) fn get_parsed<T>(row: &MySqlRow, column: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = String>,
{
    let raw: String = get(row, column)?;
    raw.parse::<T>()
        .map_err(|e| InfrastructureError::Corrupt(format!("{}: {}", column, e)).into())
}

pub(crate) fn get_opt_parsed<T>(row: &MySqlRow, column: &str) -> Result<Option<T>, DomainError>
where
    T: FromStr<Err = String>,
{
    let raw: Option<String> = get(row, column)?;
    raw.map(|raw| {
        raw.parse::<T>()
            .map_err(|e| InfrastructureError::Corrupt(format!("{}: {}", column, e)).into())
    })
    .transpose()
}

fn parse_uuid(column: &str, raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw)
        .map_err(|e| InfrastructureError::Corrupt(format!("{}: {}", column, e)).into())
}
