use anyhow::{anyhow, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::app::tokens::{IssuedToken, TokenCodec};
use crate::domain::user::{NewUser, User};
use crate::infra::store::SharedStore;

#[derive(Debug, Clone)]
pub struct Signup {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub image: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    store: SharedStore,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(store: SharedStore, tokens: TokenCodec) -> Self {
        Self { store, tokens }
    }

    /// Returns `None` when the email is already registered.
    pub async fn signup(&self, signup: Signup) -> Result<Option<User>> {
        let password_hash = hash_password(&signup.password)?;
        self.store
            .insert_user(NewUser {
                display_name: signup.display_name,
                email: signup.email,
                password_hash,
                image: signup.image,
            })
            .await
    }

    /// Returns `None` for an unknown email or a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<IssuedToken>> {
        let credentials = match self.store.find_credentials(email).await? {
            Some(credentials) => credentials,
            None => return Ok(None),
        };

        if credentials.password_hash.is_empty() {
            return Ok(None);
        }
        if !verify_password(password, &credentials.password_hash)? {
            return Ok(None);
        }

        let issued = self.tokens.issue(credentials.user_id)?;
        Ok(Some(issued))
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {}", err))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| anyhow!("failed to parse password hash: {}", err))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
