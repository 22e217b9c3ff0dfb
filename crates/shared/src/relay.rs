//! Visitor submissions forwarded to an external form-intake endpoint.
//!
//! The endpoint gives no usable acknowledgment, so delivery is tracked
//! locally: every submission sits in a [`RelayQueue`] with its attempt count
//! and status until it is delivered or runs out of attempts.

use std::time::Duration;

use url::form_urlencoded;

use crate::models::FormRelay;

/// Who visits a Spanish venue from inside Spain picks a province; everyone
/// else picks a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginKind {
    Province,
    Country,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Por favor, selecciona origen y destino.")]
    MissingRoute,
    #[error("El origen y destino no pueden ser iguales si el origen es dentro de España.")]
    SameOriginAndDestination,
    #[error("Si el origen es internacional, el destino no puede ser en España.")]
    InternationalToSpain,
    #[error("Por favor, selecciona un país de origen.")]
    MissingCountry,
    #[error("Por favor, selecciona al menos un concierto.")]
    MissingConcert,
    #[error("Por favor, escribe un mensaje.")]
    MissingMessage,
    #[error("relay has no field mapped for `{0}`")]
    UnmappedField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelSubmission {
    pub origin_kind: OriginKind,
    pub origin: String,
    pub destination: String,
}

fn mentions_spain(place: &str) -> bool {
    let place = place.to_lowercase();
    ["madrid", "españa", "spain"].iter().any(|k| place.contains(k))
}

impl TravelSubmission {
    pub fn validate(&self) -> Result<(), SubmissionError> {
        let origin = self.origin.trim();
        let destination = self.destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err(SubmissionError::MissingRoute);
        }

        let origin_in_spain = self.origin_kind == OriginKind::Province
            || origin == "Spain"
            || origin == "España";
        if origin == destination && origin_in_spain {
            return Err(SubmissionError::SameOriginAndDestination);
        }
        if self.origin_kind == OriginKind::Country && mentions_spain(destination) {
            return Err(SubmissionError::InternationalToSpain);
        }
        Ok(())
    }

    /// Logical field/value pairs, in submission order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("origin", self.origin.trim().to_string()),
            ("destination", self.destination.trim().to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpinionSubmission {
    pub name: String,
    pub country: String,
    pub concerts: Vec<String>,
    pub message: String,
    pub socials: String,
}

impl OpinionSubmission {
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.country.trim().is_empty() {
            return Err(SubmissionError::MissingCountry);
        }
        if self.concerts.is_empty() {
            return Err(SubmissionError::MissingConcert);
        }
        if self.message.trim().is_empty() {
            return Err(SubmissionError::MissingMessage);
        }
        Ok(())
    }

    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let name = match self.name.trim() {
            "" => "Anónimo".to_string(),
            n => n.to_string(),
        };
        vec![
            ("name", name),
            ("country", self.country.trim().to_string()),
            ("concert", self.concerts.join(", ")),
            ("message", self.message.trim().to_string()),
            ("socials", self.socials.trim().to_string()),
        ]
    }
}

impl FormRelay {
    /// URL-encoded body using the endpoint's own field names.
    pub fn encode(&self, fields: &[(&'static str, String)]) -> Result<String, SubmissionError> {
        let mut body = form_urlencoded::Serializer::new(String::new());
        for (logical, value) in fields {
            let name = self
                .fields
                .get(*logical)
                .ok_or(SubmissionError::UnmappedField(logical))?;
            body.append_pair(name, value);
        }
        Ok(body.finish())
    }
}

/// What a queued request carries, for the status the visitor sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Travel,
    Opinion,
}

impl SubmissionKind {
    /// Confirmation shown once the endpoint has accepted the request.
    pub fn confirmation(self) -> &'static str {
        match self {
            SubmissionKind::Travel => "Viaje añadido correctamente.",
            SubmissionKind::Opinion => "Gracias por enviar tu mensaje. ¡Nos encanta leerte!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    InFlight,
    Delivered,
    Failed(String),
}

/// A queued request: where it goes and the encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub id: u64,
    pub kind: SubmissionKind,
    pub endpoint: String,
    pub body: String,
    pub attempts: u32,
    pub status: DeliveryStatus,
}

/// Retry policy for the relay: attempt count and exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt number `attempt` (1-based). The first attempt is
    /// immediate; later ones double from `base_delay`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.base_delay * 2u32.pow(attempt - 2)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelayQueue {
    items: Vec<Outgoing>,
    next_id: u64,
    policy: RetryPolicy,
}

impl RelayQueue {
    pub fn new(policy: RetryPolicy) -> Self {
        RelayQueue {
            items: Vec::new(),
            next_id: 1,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn items(&self) -> &[Outgoing] {
        &self.items
    }

    pub fn get(&self, id: u64) -> Option<&Outgoing> {
        self.items.iter().find(|o| o.id == id)
    }

    pub fn enqueue(&mut self, kind: SubmissionKind, endpoint: impl Into<String>, body: String) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.items.push(Outgoing {
            id,
            kind,
            endpoint: endpoint.into(),
            body,
            attempts: 0,
            status: DeliveryStatus::Pending,
        });
        id
    }

    /// Claim a pending item for sending and count the attempt. `None` when the
    /// item is unknown or not pending.
    pub fn start(&mut self, id: u64) -> Option<Outgoing> {
        let item = self
            .items
            .iter_mut()
            .find(|o| o.id == id && o.status == DeliveryStatus::Pending)?;
        item.attempts += 1;
        item.status = DeliveryStatus::InFlight;
        Some(item.clone())
    }

    pub fn mark_delivered(&mut self, id: u64) {
        if let Some(item) = self.items.iter_mut().find(|o| o.id == id) {
            item.status = DeliveryStatus::Delivered;
        }
    }

    /// Record a failed attempt. Returns the delay before the retry, or `None`
    /// when the item has used up its attempts and is now `Failed`.
    pub fn mark_failed(&mut self, id: u64, reason: impl Into<String>) -> Option<Duration> {
        let item = self.items.iter_mut().find(|o| o.id == id)?;
        if item.attempts >= self.policy.max_attempts {
            item.status = DeliveryStatus::Failed(reason.into());
            None
        } else {
            item.status = DeliveryStatus::Pending;
            Some(self.policy.delay_before(item.attempts + 1))
        }
    }

    pub fn has_pending(&self) -> bool {
        self.items.iter().any(|o| o.status == DeliveryStatus::Pending)
    }

    /// Drop finished items so the status list only shows live work.
    pub fn prune_delivered(&mut self) {
        self.items.retain(|o| o.status != DeliveryStatus::Delivered);
    }
}
