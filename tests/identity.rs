//! Guest identity model: shared emails, password-keyed identities, and
//! the collision rule that keeps each (email, password) pair unique.

mod common;

use festra_server::engine::{EngineError, NewUser};

use common::engine;

fn guest(name: &str, email: &str, password: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        is_institute: false,
        first_name: None,
        last_name: None,
        contact_number: None,
        college: None,
    }
}

#[tokio::test]
async fn guests_sharing_an_email_stay_distinct() {
    let (eng, _store) = engine();

    let first = eng
        .identity
        .register(guest("Asha", "family@example.com", "ashapass"))
        .await
        .unwrap();
    let second = eng
        .identity
        .register(guest("Ravi", "family@example.com", "ravipass"))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    // Each password resolves to its own account.
    let resolved = eng
        .identity
        .resolve("family@example.com", "ashapass")
        .await
        .unwrap();
    assert_eq!(resolved.id, first.id);
    let resolved = eng
        .identity
        .resolve("family@example.com", "ravipass")
        .await
        .unwrap();
    assert_eq!(resolved.id, second.id);

    // A third account reusing an existing password is rejected: the pair
    // is the identity key.
    let err = eng
        .identity
        .register(guest("Sita", "family@example.com", "ashapass"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (eng, _store) = engine();
    eng.identity
        .register(guest("Asha", "asha@example.com", "ashapass"))
        .await
        .unwrap();

    let unknown = eng
        .identity
        .resolve("nobody@example.com", "whatever")
        .await
        .unwrap_err();
    let wrong = eng
        .identity
        .resolve("asha@example.com", "wrongpass")
        .await
        .unwrap_err();
    assert!(matches!(unknown, EngineError::InvalidCredentials));
    assert!(matches!(wrong, EngineError::InvalidCredentials));
}

#[tokio::test]
async fn institute_emails_are_globally_unique() {
    let (eng, _store) = engine();

    let mut first = guest("Dev", "dev@students.iiit.ac.in", "firstpass");
    first.is_institute = true;
    eng.identity.register(first).await.unwrap();

    let mut second = guest("Dev Again", "dev@students.iiit.ac.in", "otherpass");
    second.is_institute = true;
    let err = eng.identity.register(second).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn institute_registration_requires_institute_domain() {
    let (eng, _store) = engine();

    let mut outsider = guest("Mallory", "mallory@gmail.com", "sneakypass");
    outsider.is_institute = true;
    let err = eng.identity.register(outsider).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn emails_are_normalized_to_lowercase() {
    let (eng, _store) = engine();

    eng.identity
        .register(guest("Asha", "Asha@Example.COM", "ashapass"))
        .await
        .unwrap();
    let resolved = eng
        .identity
        .resolve("asha@example.com", "ashapass")
        .await
        .unwrap();
    assert_eq!(resolved.email, "asha@example.com");
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let (eng, _store) = engine();
    let err = eng
        .identity
        .register(guest("Tiny", "tiny@example.com", "12345"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
