use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    client::Verifier,
    error::VerifyError,
    model::{is_domestic, AddressInput, Verification, VerifiedAddress},
};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("cannot verify an address outside the US (country: {0:?})")]
    Foreign(String),
    #[error(transparent)]
    Verify(#[from] VerifyError),
}

/// Customer address as held by the storefront. Field names follow the
/// storefront's columns, not the provider's.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRecord {
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    #[serde(skip_deserializing)]
    pub errors: Vec<String>,
}

fn blank(x: &str) -> bool {
    x.trim().is_empty()
}

impl AddressRecord {
    pub fn in_united_states(&self) -> bool {
        is_domestic(&self.country)
    }

    pub fn to_input(&self) -> AddressInput {
        AddressInput {
            street: self.address1.clone(),
            secondary: self.address2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zipcode: self.zipcode.clone(),
            country: self.country.clone(),
        }
    }

    /// Verifies the address and, when the provider finds it, overwrites the
    /// street, city, state and zipcode with the normalized values.
    ///
    /// Incomplete addresses are reported undeliverable without a lookup.
    /// Foreign addresses are an error.
    pub fn deliverable_address(&mut self, verifier: &impl Verifier) -> Result<bool, RecordError> {
        if !self.in_united_states() {
            return Err(RecordError::Foreign(self.country.clone()));
        }

        if blank(&self.address1) || blank(&self.city) || blank(&self.zipcode) {
            debug!(input = %self.to_input(), "incomplete address, skipping lookup");
            return Ok(false);
        }

        let verification = verifier.verify(&self.to_input())?;
        if let Verification::Verified(x) = &verification {
            self.normalize(x);
        }
        Ok(verification.is_deliverable())
    }

    /// Copies normalized fields over the entered ones. Fields the provider
    /// left blank keep what the customer typed.
    fn normalize(&mut self, x: &VerifiedAddress) {
        for (field, value) in [
            (&mut self.address1, &x.street_line),
            (&mut self.city, &x.city),
            (&mut self.state, &x.state),
            (&mut self.zipcode, &x.zipcode),
        ] {
            if !blank(value) {
                field.clone_from(value);
            }
        }
        self.address2 = x.secondary_line.clone();
    }

    /// Checks required fields, then verifies US addresses. Returns whether the
    /// record is valid; messages end up in `errors`.
    ///
    /// Provider and configuration failures are returned as `Err`, they are not
    /// the customer's fault.
    pub fn validate(&mut self, verifier: &impl Verifier) -> Result<bool, RecordError> {
        self.errors.clear();

        for (name, value) in [
            ("firstname", &self.firstname),
            ("lastname", &self.lastname),
            ("address1", &self.address1),
            ("city", &self.city),
            ("zipcode", &self.zipcode),
            ("country", &self.country),
            ("phone", &self.phone),
        ] {
            if blank(value) {
                self.errors.push(format!("{name} can't be blank"));
            }
        }

        if self.errors.is_empty()
            && self.in_united_states()
            && !self.deliverable_address(verifier)?
        {
            self.errors.push("address is not deliverable".into());
        }

        Ok(self.errors.is_empty())
    }
}
