use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash};

use crate::models::User;

#[derive(Debug, Clone)]
pub struct Argon2Hash(Argon2<'static>);

#[derive(Clone)]
pub struct AuthService {
    hasher: Arc<Argon2Hash>,
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthService {
    pub fn new() -> Self {
        let hash = Argon2Hash(Argon2::default());

        Self {
            hasher: Arc::new(hash),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, password_hash::Error> {
        let hash_salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = self.hasher.0.hash_password(password.as_ref(), &hash_salt)?;

        Ok(hash.to_string())
    }

    pub fn verify(&self, user: &User, password: &str) -> Result<bool, password_hash::Error> {
        let parsed_hash = PasswordHash::new(&user.password)?;

        Ok(self
            .hasher
            .0
            .verify_password(password.as_ref(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;

    fn user_with_password(password: String) -> User {
        User {
            id: 0,
            email: String::from("tech@lab.org"),
            password,
            full_name: None,
            role: String::from("user"),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let auth_service = AuthService::new();

        let hash = auth_service.hash("test").unwrap();
        assert!(hash.starts_with("$argon2"));

        let user = user_with_password(hash);
        assert!(auth_service.verify(&user, "test").unwrap());
        assert!(!auth_service.verify(&user, "wrong").unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let auth_service = AuthService::new();
        let user = user_with_password(String::from("plain"));

        assert!(auth_service.verify(&user, "plain").is_err());
    }
}
