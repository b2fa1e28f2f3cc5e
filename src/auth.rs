use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

const TOKEN_LIFETIME_HOURS: i64 = 1;

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub fn create_token(staff: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (chrono::Utc::now() + chrono::Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;

    let claims = Claims {
        sub: staff.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn validate_token(token: &str, secret: &str) -> bool {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .is_ok()
}

/// Checks staff credentials against the configured bcrypt hash.
pub fn verify_staff(config: &AppConfig, username: &str, password: &str) -> bool {
    let Some(hash) = config.staff_password_hash.as_deref() else {
        return false;
    };
    if username != config.staff_username {
        return false;
    }
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            log::warn!("staff password hash could not be checked: {}", e);
            false
        }
    }
}
