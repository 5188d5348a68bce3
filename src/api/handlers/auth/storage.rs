//! Database helpers for credential records.
//!
//! Every mutation is a single UPDATE statement, so concurrent writers to the
//! same record serialize on the row and never interleave a partial state.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

const CREDENTIAL_COLUMNS: &str = "id, email, phone, password_hash, otp, otp_expires_at";

/// One user credential row.
pub(super) struct CredentialRecord {
    pub(super) id: Uuid,
    pub(super) email: String,
    pub(super) phone: String,
    pub(super) password_hash: String,
    pub(super) otp: Option<String>,
    pub(super) otp_expires_at: Option<DateTime<Utc>>,
}

/// Whether a record currently carries a usable challenge code.
pub(super) enum OtpState<'a> {
    /// No challenge outstanding.
    None,
    /// A code is stored but its deadline has passed.
    Expired,
    /// A live code; a missing deadline means no expiry is enforced.
    Active(&'a str),
}

impl CredentialRecord {
    pub(super) fn otp_state(&self, now: DateTime<Utc>) -> OtpState<'_> {
        match (&self.otp, self.otp_expires_at) {
            (None, _) => OtpState::None,
            (Some(_), Some(deadline)) if deadline <= now => OtpState::Expired,
            (Some(otp), _) => OtpState::Active(otp),
        }
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> CredentialRecord {
    CredentialRecord {
        id: row.get("id"),
        email: row.get("email"),
        phone: row.get("phone"),
        password_hash: row.get("password_hash"),
        otp: row.get("otp"),
        otp_expires_at: row.get("otp_expires_at"),
    }
}

/// Look up a record by login identifier: email case-insensitively, phone exactly.
pub(super) async fn lookup_by_identifier(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<CredentialRecord>> {
    let query = format!(
        "SELECT {CREDENTIAL_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) OR phone = $1 LIMIT 1"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(identifier)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup credential by identifier")?;

    Ok(row.as_ref().map(record_from_row))
}

/// Look up a record by email, case-insensitively.
pub(super) async fn lookup_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<CredentialRecord>> {
    let query =
        format!("SELECT {CREDENTIAL_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup credential by email")?;

    Ok(row.as_ref().map(record_from_row))
}

/// Store a fresh challenge code, overwriting any prior one.
///
/// Returns false if the record no longer exists.
pub(super) async fn store_otp(
    pool: &PgPool,
    id: Uuid,
    otp: &str,
    ttl_seconds: i64,
) -> Result<bool> {
    let query = r"
        UPDATE users
        SET otp = $2,
            otp_expires_at = NOW() + ($3 * INTERVAL '1 second'),
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(id)
        .bind(otp)
        .bind(ttl_seconds)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to store otp")?;

    Ok(result.rows_affected() > 0)
}

/// Clear the challenge code, but only if it still matches the expected value.
///
/// The guard makes the clear atomic with the comparison: if a concurrent
/// issuance rotated the code between read and clear, nothing is consumed and
/// the caller reports a mismatch.
pub(super) async fn consume_otp(pool: &PgPool, id: Uuid, expected_otp: &str) -> Result<bool> {
    let query = r"
        UPDATE users
        SET otp = NULL,
            otp_expires_at = NULL,
            updated_at = NOW()
        WHERE id = $1
          AND otp = $2
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(id)
        .bind(expected_otp)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to consume otp")?;

    Ok(result.rows_affected() > 0)
}

/// Commit a new password hash and invalidate any outstanding challenge.
pub(super) async fn update_password_and_clear_otp(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<bool> {
    let query = r"
        UPDATE users
        SET password_hash = $2,
            otp = NULL,
            otp_expires_at = NULL,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update password")?;

    Ok(result.rows_affected() > 0)
}
