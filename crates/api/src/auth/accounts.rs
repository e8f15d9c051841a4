//! Registration and login on top of the user repo.
//!
//! bcrypt is CPU bound, so hashing and verification run on the blocking pool.

use infra::models::UserRow;
use infra::repos::UserRepo;
use infra::StoreError;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::password::PasswordService;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password is too short")]
    PasswordTooShort,

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub async fn register(
    users: &UserRepo,
    email: &str,
    password: &str,
    min_length: usize,
) -> Result<UserRow, AccountError> {
    if !PasswordService::is_long_enough(password, min_length) {
        return Err(AccountError::PasswordTooShort);
    }

    let password = password.to_string();
    let password_hash =
        tokio::task::spawn_blocking(move || PasswordService::hash_password(&password)).await??;

    let user = users.create(email, &password_hash).await?;
    info!(user_id = %user.id, "user registered");
    Ok(user)
}

pub async fn authenticate(
    users: &UserRepo,
    email: &str,
    password: &str,
) -> Result<UserRow, AccountError> {
    let Some(user) = users
        .get_by_email(email)
        .await
        .map_err(StoreError::from)?
    else {
        debug!("login for unknown email");
        return Err(AccountError::InvalidCredentials);
    };

    let password = password.to_string();
    let password_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || {
        PasswordService::verify_password(&password, &password_hash)
    })
    .await??;

    if valid {
        Ok(user)
    } else {
        Err(AccountError::InvalidCredentials)
    }
}
