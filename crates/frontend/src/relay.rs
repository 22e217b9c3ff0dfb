use dioxus::logger::tracing;
use dioxus::prelude::*;
use tourmap_shared::models::FormRelay;
use tourmap_shared::relay::{DeliveryStatus, Outgoing, RelayQueue, SubmissionError, SubmissionKind};

use crate::api;

/// Encode `fields` for `relay`, queue the request and start delivering it.
/// Encoding errors are returned before anything is queued. Delivery runs
/// detached from the calling component; the queue lives at the app root.
pub fn submit(
    mut queue: Signal<RelayQueue>,
    kind: SubmissionKind,
    relay: &FormRelay,
    fields: &[(&'static str, String)],
) -> Result<u64, SubmissionError> {
    let body = relay.encode(fields)?;
    let id = queue.write().enqueue(kind, relay.endpoint.clone(), body);
    tracing::debug!(id, endpoint = %relay.endpoint, "Submission queued");
    wasm_bindgen_futures::spawn_local(deliver(queue, id));
    Ok(id)
}

async fn deliver(mut queue: Signal<RelayQueue>, id: u64) {
    loop {
        let Some(item) = queue.write().start(id) else {
            return;
        };
        match api::post_form(&item.endpoint, &item.body).await {
            Ok(()) => {
                tracing::info!(id, attempts = item.attempts, "Submission delivered");
                queue.write().mark_delivered(id);
                return;
            }
            Err(e) => {
                tracing::warn!(id, attempt = item.attempts, error = %e, "Submission attempt failed");
                let retry = queue.write().mark_failed(id, e);
                match retry {
                    Some(delay) => gloo_timers::future::sleep(delay).await,
                    None => {
                        tracing::error!(id, "Submission failed, giving up");
                        return;
                    }
                }
            }
        }
    }
}

/// User-facing text for a queued item. The confirmation only appears once
/// the endpoint has taken the request.
pub fn status_label(item: &Outgoing) -> String {
    match &item.status {
        DeliveryStatus::Pending => "En cola…".to_string(),
        DeliveryStatus::InFlight => "Enviando…".to_string(),
        DeliveryStatus::Delivered => item.kind.confirmation().to_string(),
        DeliveryStatus::Failed(reason) => {
            format!("Error al enviar. Inténtalo de nuevo más tarde. ({})", reason)
        }
    }
}

pub fn status_class(status: &DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Pending | DeliveryStatus::InFlight => "relay-pending",
        DeliveryStatus::Delivered => "relay-delivered",
        DeliveryStatus::Failed(_) => "relay-failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: SubmissionKind, status: DeliveryStatus) -> Outgoing {
        Outgoing {
            id: 1,
            kind,
            endpoint: "https://forms/x".to_string(),
            body: String::new(),
            attempts: 1,
            status,
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(
            status_label(&item(SubmissionKind::Travel, DeliveryStatus::InFlight)),
            "Enviando…"
        );
        let failed = status_label(&item(
            SubmissionKind::Travel,
            DeliveryStatus::Failed("offline".to_string()),
        ));
        assert!(failed.starts_with("Error al enviar"));
        assert!(failed.contains("offline"));
    }

    #[test]
    fn test_confirmation_waits_for_delivery() {
        for status in [DeliveryStatus::Pending, DeliveryStatus::InFlight] {
            let label = status_label(&item(SubmissionKind::Travel, status));
            assert_ne!(label, "Viaje añadido correctamente.");
        }
        assert_eq!(
            status_label(&item(SubmissionKind::Travel, DeliveryStatus::Delivered)),
            "Viaje añadido correctamente."
        );
        assert_eq!(
            status_label(&item(SubmissionKind::Opinion, DeliveryStatus::Delivered)),
            "Gracias por enviar tu mensaje. ¡Nos encanta leerte!"
        );
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(status_class(&DeliveryStatus::Pending), "relay-pending");
        assert_eq!(status_class(&DeliveryStatus::Delivered), "relay-delivered");
        assert_eq!(
            status_class(&DeliveryStatus::Failed(String::new())),
            "relay-failed"
        );
    }
}
