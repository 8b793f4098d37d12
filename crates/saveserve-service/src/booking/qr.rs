//! QR payload generation and verification.
//!
//! The payload is a JSON document binding the booking, recipient, and
//! listing ids together with a truncated keyed hash. It is
//! integrity-only: the ids are plaintext, and expiry lives on the booking
//! row (`qr_expires_at`), not in the hash.

use rand::RngExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use saveserve_core::config::booking::BookingConfig;
use saveserve_core::error::AppError;

/// Type discriminator carried in every collection payload.
const COLLECTION_TYPE: &str = "collection";

/// Number of hex characters kept from the SHA-256 digest.
const HASH_LENGTH: usize = 16;

/// The JSON structure encoded into the QR image by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrPayload {
    /// Payload type discriminator; must equal `"collection"`.
    #[serde(rename = "type")]
    pub payload_type: String,
    /// The booking being collected.
    pub booking_id: Uuid,
    /// The recipient the booking belongs to.
    pub recipient_id: Uuid,
    /// The listing being collected from.
    pub listing_id: Uuid,
    /// Unix timestamp at which the payload was issued.
    pub issued_at: i64,
    /// Truncated keyed SHA-256 over `booking-recipient-issued_at`.
    pub hash: String,
}

/// Generates and verifies collection QR payloads and backup codes.
#[derive(Clone)]
pub struct QrService {
    secret: String,
}

impl std::fmt::Debug for QrService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrService").finish()
    }
}

impl QrService {
    /// Creates a new QR service from booking configuration.
    pub fn new(config: &BookingConfig) -> Self {
        Self {
            secret: config.qr_secret.clone(),
        }
    }

    /// Builds the signed payload string stored on the booking at approval.
    pub fn generate_payload(
        &self,
        booking_id: Uuid,
        recipient_id: Uuid,
        listing_id: Uuid,
        issued_at: i64,
    ) -> Result<String, AppError> {
        let payload = QrPayload {
            payload_type: COLLECTION_TYPE.to_string(),
            booking_id,
            recipient_id,
            listing_id,
            issued_at,
            hash: self.compute_hash(booking_id, recipient_id, issued_at),
        };
        Ok(serde_json::to_string(&payload)?)
    }

    /// Parses and verifies a presented payload.
    ///
    /// Rejects malformed JSON, a wrong type discriminator, and any payload
    /// whose recomputed hash does not match the embedded one.
    pub fn verify_payload(&self, qr_data: &str) -> Result<QrPayload, AppError> {
        let payload: QrPayload = serde_json::from_str(qr_data)
            .map_err(|_| AppError::validation("Malformed QR payload"))?;

        if payload.payload_type != COLLECTION_TYPE {
            return Err(AppError::validation("QR payload is not a collection code"));
        }

        let expected =
            self.compute_hash(payload.booking_id, payload.recipient_id, payload.issued_at);
        if payload.hash != expected {
            return Err(AppError::validation("QR payload failed verification"));
        }

        Ok(payload)
    }

    /// Generates the 6-digit backup collection code.
    pub fn generate_collection_code(&self) -> String {
        let mut rng = rand::rng();
        format!("{:06}", rng.random_range(0..1_000_000))
    }

    fn compute_hash(&self, booking_id: Uuid, recipient_id: Uuid, issued_at: i64) -> String {
        let input = format!("{booking_id}-{recipient_id}-{issued_at}-{}", self.secret);
        let digest = Sha256::digest(input.as_bytes());
        format!("{digest:x}")[..HASH_LENGTH].to_string()
    }
}
