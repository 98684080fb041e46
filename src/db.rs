use std::{str::FromStr, time::Duration};

use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
    SqlitePool,
};

use crate::{
    errors::AppError,
    models::{Account, PasswordReset},
    utils,
};

pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .read_only(false)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opts).await?;
    sqlx::migrate!().run(&pool).await?;
    log::info!("Database migrated successfully");
    Ok(pool)
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub async fn create_account(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    pwd_hash: &str,
) -> Result<Account, AppError> {
    let created_at = now();
    let account = sqlx::query_as::<_, Account>(
        "INSERT INTO accounts (created_at, updated_at, name, email, pwd_hash) \
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&created_at)
    .bind(&created_at)
    .bind(name)
    .bind(email)
    .bind(pwd_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email already registered".to_owned())
        } else {
            AppError::DatabaseError(e)
        }
    })?;
    log::info!("Account created: {} ({})", account.id, account.email);
    Ok(account)
}

pub async fn get_account_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn get_account_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    email: &str,
) -> Result<Account, AppError> {
    let account = sqlx::query_as::<_, Account>(
        "UPDATE accounts SET updated_at = ?, name = ?, email = ? WHERE id = ? RETURNING *",
    )
    .bind(now())
    .bind(name)
    .bind(email)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email already registered".to_owned())
        } else {
            AppError::DatabaseError(e)
        }
    })?
    .ok_or(AppError::NotFound)?;
    log::info!("Account {} profile updated", id);
    Ok(account)
}

pub async fn update_password(pool: &SqlitePool, id: i64, pwd_hash: &str) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE accounts SET updated_at = ?, pwd_hash = ? WHERE id = ?")
        .bind(now())
        .bind(pwd_hash)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    log::info!("Password changed for account {}", id);
    Ok(())
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64, at: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE accounts SET last_login_at = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Issues a single-use reset token for `account_id`, valid for `ttl`.
pub async fn create_password_reset(
    pool: &SqlitePool,
    account_id: i64,
    ttl: chrono::Duration,
) -> Result<PasswordReset, sqlx::Error> {
    let created = Utc::now();
    let reset = sqlx::query_as::<_, PasswordReset>(
        "INSERT INTO password_resets (token, account_id, created_at, expires_at) \
         VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(utils::generate_token())
    .bind(account_id)
    .bind(created.to_rfc3339())
    .bind((created + ttl).to_rfc3339())
    .fetch_one(pool)
    .await?;
    Ok(reset)
}

/// Returns the reset if the token exists, is unused and has not expired.
pub async fn find_valid_reset(
    pool: &SqlitePool,
    token: &str,
    at: DateTime<Utc>,
) -> Result<Option<PasswordReset>, sqlx::Error> {
    let reset = sqlx::query_as::<_, PasswordReset>(
        "SELECT * FROM password_resets WHERE token = ? AND used_at IS NULL",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(reset.filter(|r| {
        DateTime::parse_from_rfc3339(&r.expires_at)
            .map(|expires| expires.with_timezone(&Utc) > at)
            .unwrap_or(false)
    }))
}

/// Sets the new password hash and burns the token in one transaction.
pub async fn complete_password_reset(
    pool: &SqlitePool,
    reset: &PasswordReset,
    pwd_hash: &str,
) -> Result<(), AppError> {
    let at = now();
    let mut tx = pool.begin().await?;
    let burned =
        sqlx::query("UPDATE password_resets SET used_at = ? WHERE token = ? AND used_at IS NULL")
            .bind(&at)
            .bind(&reset.token)
            .execute(&mut *tx)
            .await?;
    if burned.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "This reset link is invalid or has expired".to_owned(),
        ));
    }
    sqlx::query("UPDATE accounts SET updated_at = ?, pwd_hash = ? WHERE id = ?")
        .bind(&at)
        .bind(pwd_hash)
        .bind(reset.account_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    log::info!("Password reset completed for account {}", reset.account_id);
    Ok(())
}
