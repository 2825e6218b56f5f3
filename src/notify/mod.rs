//! Outbound notifications. Everything here is fire-and-forget: failures
//! are logged and swallowed, and nothing in the allocation path ever
//! waits on a delivery.

pub mod discord;
pub mod email;

use std::sync::Arc;

use async_trait::async_trait;

pub use email::ResendMailer;

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, body: &str);
}

/// Detaches delivery from the request. Admission is already durable by
/// the time this is called; a lost email never rolls a ticket back.
pub fn send_in_background(
    notifier: Arc<dyn Notifier>,
    to: String,
    subject: String,
    body: String,
) {
    tokio::spawn(async move {
        notifier.send(&to, &subject, &body).await;
    });
}
