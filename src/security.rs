use pbkdf2::{
    password_hash::{Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Pbkdf2,
};

/// Hash a password with PBKDF2-SHA256 and a fresh random salt.
///
/// The result is a PHC string (`$pbkdf2-sha256$i=...,l=32$<salt>$<hash>`) that
/// carries its own parameters, so it can be verified after the defaults change.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())?;
    let hash = Pbkdf2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a value produced by [`hash_password`].
///
/// A stored value that is not a valid PHC string never verifies.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(encoded) else {
        return false;
    };
    Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok()
}
