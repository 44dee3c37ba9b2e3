//! Single-call client for the SmartyStreets US street address API.
//!
//! Domestic addresses only. Callers check [`AddressInput::is_domestic`] first
//! and skip the call for everything else; the client itself does not branch on
//! country.

use tracing::{debug, error, warn};

use crate::{
    config::ClientConfig,
    error::VerifyError,
    model::{AddressInput, Candidate, Verification, VerifiedAddress},
    transport::{Transport, UreqTransport},
};

pub type VerificationOutcome = Result<Verification, VerifyError>;

/// Anything that can turn an address into a verification outcome.
pub trait Verifier: Sync {
    fn verify(&self, input: &AddressInput) -> VerificationOutcome;
}

pub struct VerificationClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl VerificationClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self { config, transport }
    }
}

impl<T: Transport> VerificationClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }
}

impl<T: Transport> Verifier for VerificationClient<T> {
    fn verify(&self, input: &AddressInput) -> VerificationOutcome {
        let Some(creds) = self.config.credentials() else {
            return Err(VerifyError::Configuration(
                "SMARTY_STREETS_AUTH_ID and SMARTY_STREETS_AUTH_TOKEN must be specified".into(),
            ));
        };

        let candidates = self.config.candidates.to_string();
        let mut query = vec![
            ("auth-id", creds.auth_id.as_str()),
            ("auth-token", creds.auth_token.as_str()),
        ];
        query.extend(input.query_pairs());
        query.push(("candidates", candidates.as_str()));

        debug!(endpoint = %self.config.endpoint, %input, "verifying address");
        let response = self
            .transport
            .get(&self.config.endpoint, &query)
            .map_err(|e| transient(input, format!("{e:#}")))?;

        if !response.is_success() {
            warn!(status = response.status, %input, "address provider returned an error");
            return Err(VerifyError::Provider {
                status: response.status,
                body: response.body,
            });
        }

        let candidates: Vec<Candidate> = serde_json::from_str(&response.body)
            .map_err(|e| transient(input, format!("malformed provider response: {e}")))?;

        match candidates.into_iter().next() {
            Some(x) => Ok(Verification::Verified(VerifiedAddress::from(x))),
            None => {
                debug!(%input, "no deliverable match");
                Ok(Verification::NotDeliverable)
            }
        }
    }
}

fn transient(input: &AddressInput, message: String) -> VerifyError {
    error!(%input, error = %message, "error verifying address");
    VerifyError::Transient(message)
}
