//! Identity resolution under the guest identity model. Institute accounts
//! have a globally unique email; guest accounts may share one and are
//! distinguished by password, so both login and registration enumerate
//! every account under the email and test credentials one by one. There
//! is deliberately no unique index to short-circuit this.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use uuid::Uuid;

use crate::auth::password;
use crate::models::{Role, User};
use crate::store::Store;

use super::EngineError;

static INSTITUTE_EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-zA-Z0-9._%+-]+@([a-zA-Z0-9-]+\.)*iiit\.ac\.in$")
        .expect("institute email pattern is valid")
});

const MIN_PASSWORD_LEN: usize = 6;

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_institute: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_number: Option<String>,
    pub college: Option<String>,
}

#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn Store>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Which account does `(email, password)` address? Linear scan over
    /// all accounts under the email; the first credential match wins.
    /// Unknown email and wrong password are indistinguishable to callers.
    pub async fn resolve(&self, email: &str, password: &str) -> Result<User, EngineError> {
        let candidates = self.store.users_by_email(&email.to_lowercase()).await?;
        for user in candidates {
            if password::verify(password, &user.password_hash) {
                return Ok(user);
            }
        }
        Err(EngineError::InvalidCredentials)
    }

    /// Creates an account. Institute emails must be institute-domain and
    /// globally unique; a guest password may not collide with any other
    /// account under the same email, since the pair is the identity key.
    pub async fn register(&self, new: NewUser) -> Result<User, EngineError> {
        if new.name.trim().is_empty() || new.email.trim().is_empty() {
            return Err(EngineError::Validation(
                "Please provide name, email, and password".to_string(),
            ));
        }
        if new.password.len() < MIN_PASSWORD_LEN {
            return Err(EngineError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        let email = new.email.to_lowercase();
        let existing = self.store.users_by_email(&email).await?;

        if new.is_institute {
            if !INSTITUTE_EMAIL_RE.is_match(&email) {
                return Err(EngineError::Validation(
                    "Only institute email addresses are allowed for institute registration"
                        .to_string(),
                ));
            }
            if !existing.is_empty() {
                return Err(EngineError::Validation(
                    "A user with this email already exists".to_string(),
                ));
            }
        } else {
            for account in &existing {
                if password::verify(&new.password, &account.password_hash) {
                    return Err(EngineError::Validation(
                        "This password is already associated with an account using this \
                         email. Please use a different password to create a distinct identity."
                            .to_string(),
                    ));
                }
            }
        }

        let now = chrono::Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email,
            password_hash: password::hash(&new.password),
            role: Role::Participant,
            is_institute: new.is_institute,
            first_name: new.first_name,
            last_name: new.last_name,
            contact_number: new.contact_number,
            college: new.college,
            discord_webhook: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_user(&user).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn institute_pattern_matches_subdomains() {
        assert!(INSTITUTE_EMAIL_RE.is_match("a.b@students.iiit.ac.in"));
        assert!(INSTITUTE_EMAIL_RE.is_match("x@iiit.ac.in"));
        assert!(!INSTITUTE_EMAIL_RE.is_match("x@gmail.com"));
        assert!(!INSTITUTE_EMAIL_RE.is_match("x@iiit.ac.in.evil.com"));
    }
}
