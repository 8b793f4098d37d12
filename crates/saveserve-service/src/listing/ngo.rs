//! NGO bulk-listing email fan-out.

use std::sync::Arc;

use tracing::{error, info};

use saveserve_database::repositories::user::UserRepository;
use saveserve_entity::listing::FoodListing;

use crate::email::EmailClient;

/// Emails every NGO-subrole recipient when a bulk listing appears.
///
/// The fan-out is a plain loop with per-recipient error swallowing: no
/// retry, no backoff, no deduplication against repeat alerts for the same
/// listing. Best-effort by contract.
#[derive(Debug, Clone)]
pub struct NgoAlertService {
    user_repo: Arc<UserRepository>,
    email: Arc<EmailClient>,
}

impl NgoAlertService {
    /// Creates a new NGO alert service.
    pub fn new(user_repo: Arc<UserRepository>, email: Arc<EmailClient>) -> Self {
        Self { user_repo, email }
    }

    /// Send the bulk-listing alert for `listing` to every NGO recipient.
    ///
    /// The caller has already decided the listing crosses the bulk
    /// threshold (its `is_ngo_exclusive` flag is set).
    pub async fn alert_ngos(&self, listing: &FoodListing) {
        let ngos = match self.user_repo.find_ngo_recipients().await {
            Ok(ngos) => ngos,
            Err(e) => {
                error!(listing_id = %listing.id, "NGO fan-out aborted: {e}");
                return;
            }
        };

        let subject = format!("Bulk surplus available: {}", listing.title);
        let body = format!(
            "{} has posted {} {} of {} at {}. This listing is reserved for \
             NGOs until {}.",
            listing.provider_name,
            listing.quantity,
            listing.unit,
            listing.title,
            listing.location,
            listing
                .ngo_exclusive_until
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "further notice".to_string()),
        );

        let mut sent = 0usize;
        for ngo in &ngos {
            match self.email.send(&ngo.email, &subject, &body).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    error!(listing_id = %listing.id, to = %ngo.email, "NGO alert failed: {e}");
                }
            }
        }

        info!(
            listing_id = %listing.id,
            sent,
            total = ngos.len(),
            "NGO bulk alert fan-out finished"
        );
    }
}
