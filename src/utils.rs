use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};

pub const MIN_PASSWORD_LEN: usize = 12;
pub const MAX_PASSWORD_LEN: usize = 128;
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;':\",.<>?/";

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// `Ok(false)` for a wrong password, `Err` only when the stored hash is unreadable.
pub fn verify_password(
    provided: &str,
    stored_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(stored_hash)?;
    match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Random 256-bit token, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("All fields are required");
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("Invalid email address"),
    }
}

pub fn validate_password_length(password: &str) -> Result<(), &'static str> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err("Password must be at least 12 characters long");
    }
    if len > MAX_PASSWORD_LEN {
        return Err("Password must be at most 128 characters long");
    }
    Ok(())
}

/// Rules for any password being set: confirmation, length and character mix.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), &'static str> {
    if password.is_empty() || confirmation.is_empty() {
        return Err("All fields are required");
    }
    if password != confirmation {
        return Err("Passwords do not match");
    }
    validate_password_length(password)?;
    if !password.chars().any(|c| c.is_ascii_digit())
        || !password.chars().any(|c| c.is_alphabetic())
        || !password.chars().any(|c| SPECIAL_CHARS.contains(c))
    {
        return Err(
            "Password must contain at least one number, one letter and one special character",
        );
    }
    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
