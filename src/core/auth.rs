//! Auth business logic - Registration, login, and session-token handling.
//!
//! Passwords are stored as argon2 hashes with per-user random salts; the raw
//! credential never touches the database. Sessions are stateless signed
//! tokens (HS256) carrying the user id and role with a bounded lifetime, so
//! protected operations resolve an [`Identity`] without a database lookup.

use crate::{
    entities::{user, Role, User},
    errors::{Error, Result},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};

/// The identity resolved from a valid session token.
///
/// Cart and order operations take this as their explicit caller context.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    /// The authenticated user's id
    pub user_id: i64,
    /// The authenticated user's role
    pub role: Role,
}

impl Identity {
    /// Errors with `Forbidden` unless the identity holds the admin role.
    pub fn require_admin(&self) -> Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}

/// Token claims: subject (user id), role, issued-at, and expiry.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// Hashes a password with argon2 and a fresh random salt.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal {
            message: format!("Password hashing failed: {e}"),
        })
}

/// Verifies a password against a stored argon2 hash.
///
/// A mismatch returns `Ok(false)`; an unparseable stored hash is an internal
/// error, not an auth failure.
fn verify_password(stored_hash: &str, password: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| Error::Internal {
        message: format!("Invalid stored password hash: {e}"),
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal {
            message: format!("Password verification failed: {e}"),
        }),
    }
}

/// Registers a new customer account.
///
/// Fails with `DuplicateEmail` when the email already has an account; in
/// that case no row is created.
pub async fn register(db: &DatabaseConnection, email: &str, password: &str) -> Result<user::Model> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::InvalidInput {
            message: format!("Invalid email address: '{email}'"),
        });
    }
    if password.is_empty() {
        return Err(Error::InvalidInput {
            message: "Password cannot be empty".to_string(),
        });
    }

    let existing = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateEmail {
            email: email.to_string(),
        });
    }

    let now = chrono::Utc::now();
    let model = user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        role: Set(Role::Customer),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = model.insert(db).await?;

    tracing::info!(user_id = created.id, "registered new user");
    Ok(created)
}

/// Authenticates an email/password pair and issues a session token.
///
/// Unknown email and wrong password both fail with `InvalidCredentials`, so
/// callers cannot probe which emails have accounts.
pub async fn login(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    secret: &str,
    ttl_minutes: i64,
) -> Result<(user::Model, String)> {
    let account = User::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(&account.password_hash, password)? {
        return Err(Error::InvalidCredentials);
    }

    let token = issue_token(account.id, account.role, secret, ttl_minutes)?;
    tracing::info!(user_id = account.id, "user logged in");
    Ok((account, token))
}

/// Signs a session token carrying the user id and role.
pub fn issue_token(user_id: i64, role: Role, secret: &str, ttl_minutes: i64) -> Result<String> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::minutes(ttl_minutes)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal {
        message: format!("Token signing failed: {e}"),
    })
}

/// Validates a session token and resolves the identity it carries.
///
/// An expired signature maps to `ExpiredToken`; every other validation
/// failure (bad signature, malformed claims) maps to `InvalidToken`.
pub fn authenticate(token: &str, secret: &str) -> Result<Identity> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::ExpiredToken,
        _ => Error::InvalidToken,
    })?;

    let user_id = data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| Error::InvalidToken)?;
    let role = Role::parse(&data.claims.role).ok_or(Error::InvalidToken)?;

    Ok(Identity { user_id, role })
}
