//! Stripe webhook signature verification.
//!
//! `Stripe-Signature: t=<unix>,v1=<hex hmac>[,v0=...]`. The signed payload is
//! `"{t}.{raw body}"`, keyed with the endpoint's `whsec_` secret.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::event::StripeEvent;

type HmacSha256 = Hmac<Sha256>;

/// Events older than this are rejected as replays.
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Tolerated clock skew for events stamped in the future.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    #[error("Invalid timestamp")]
    InvalidTimestamp,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No account matches the customer or user referenced by the event.
    #[error("Account not found")]
    AccountNotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Whether Stripe should redeliver.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_) | WebhookError::AccountNotFound)
    }

    /// Bad signatures and stale events are authentication failures, not bad requests.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange
        )
    }
}

/// Parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// Every `v1` entry; Stripe sends several while a secret is being rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse::<i64>().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    let sig = hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?;
                    v1_signatures.push(sig);
                }
                // v0 and unknown schemes are ignored
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("missing v1 signature".to_string()));
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

pub struct StripeWebhookVerifier {
    secret: SecretString,
}

impl StripeWebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the signature against the current clock and parses the event.
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        self.verify_and_parse_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    /// Same as [`Self::verify_and_parse`] with an explicit `now` (unix seconds).
    pub fn verify_and_parse_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        let age = now - header.timestamp;
        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        let expected = self.sign(header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|sig| sig.len() == expected.len() && bool::from(sig.ct_eq(&expected)));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// Builds the header Stripe would send for `payload` at `timestamp`.
    pub fn signature_header(&self, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
        let sig = self.sign(timestamp, payload)?;
        Ok(format!("t={},v1={}", timestamp, hex::encode(sig)))
    }

    fn sign(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret_12345";
    const NOW: i64 = 1_700_000_000;

    fn verifier() -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(SecretString::new(SECRET.to_string()))
    }

    fn sign_payload(secret: &str, timestamp: i64, payload: &str) -> String {
        StripeWebhookVerifier::new(SecretString::new(secret.to_string()))
            .signature_header(timestamp, payload.as_bytes())
            .unwrap()
    }

    fn payload() -> String {
        serde_json::json!({
            "id": "evt_1",
            "type": "customer.subscription.deleted",
            "created": NOW,
            "livemode": false,
            "data": { "object": { "id": "sub_1", "customer": "cus_1", "status": "canceled" } }
        })
        .to_string()
    }

    #[test]
    fn header_parses_multiple_v1_entries() {
        let header = SignatureHeader::parse("t=12,v1=abcd,v0=ffff,v1=0102").unwrap();
        assert_eq!(header.timestamp, 12);
        assert_eq!(header.v1_signatures, vec![vec![0xab, 0xcd], vec![0x01, 0x02]]);
    }

    #[test]
    fn header_without_signature_is_rejected() {
        assert!(matches!(
            SignatureHeader::parse("t=12"),
            Err(WebhookError::ParseError(_))
        ));
        assert!(SignatureHeader::parse("garbage").is_err());
    }

    #[test]
    fn valid_signature_parses_event() {
        let body = payload();
        let header = sign_payload(SECRET, NOW, &body);
        let event = verifier().verify_and_parse_at(body.as_bytes(), &header, NOW + 5).unwrap();
        assert_eq!(event.id, "evt_1");
    }

    #[test]
    fn tampered_payload_fails() {
        let body = payload();
        let header = sign_payload(SECRET, NOW, &body);
        let tampered = body.replace("cus_1", "cus_2");
        assert!(matches!(
            verifier().verify_and_parse_at(tampered.as_bytes(), &header, NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = payload();
        let header = sign_payload("whsec_other", NOW, &body);
        assert!(matches!(
            verifier().verify_and_parse_at(body.as_bytes(), &header, NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn stale_event_is_rejected() {
        let body = payload();
        let header = sign_payload(SECRET, NOW, &body);
        let err = verifier()
            .verify_and_parse_at(body.as_bytes(), &header, NOW + MAX_EVENT_AGE_SECS + 1)
            .unwrap_err();
        assert!(matches!(err, WebhookError::TimestampOutOfRange));
        assert!(err.is_authentication_failure());
    }

    #[test]
    fn future_event_beyond_skew_is_rejected() {
        let body = payload();
        let header = sign_payload(SECRET, NOW + 120, &body);
        assert!(matches!(
            verifier().verify_and_parse_at(body.as_bytes(), &header, NOW),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn retryability() {
        assert!(WebhookError::Database("down".into()).is_retryable());
        assert!(!WebhookError::InvalidSignature.is_retryable());
    }
}
