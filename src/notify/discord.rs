use serde_json::json;

use crate::models::Event;

/// Announces a freshly published event on the organizer's Discord
/// webhook. Spawned so publishing never blocks on Discord.
pub fn announce_event(webhook_url: String, event: &Event) {
    if webhook_url.is_empty() {
        return;
    }

    let payload = json!({
        "embeds": [{
            "title": format!("New Event Published: {}", event.name),
            "description": event.description,
            "fields": [
                { "name": "Starts", "value": event.start_at.to_rfc3339(), "inline": true },
                { "name": "Kind", "value": event.kind.as_str(), "inline": true },
                {
                    "name": "Price",
                    "value": if event.price.is_zero() {
                        "Free".to_string()
                    } else {
                        event.price.to_string()
                    },
                    "inline": true
                },
            ],
        }]
    });

    tokio::spawn(async move {
        let client = reqwest::Client::new();
        if let Err(e) = client.post(&webhook_url).json(&payload).send().await {
            tracing::warn!(error = %e, "Discord webhook delivery failed");
        }
    });
}
