//! US street address verification against SmartyStreets.
//!
//! [`VerificationClient`] makes one lookup per call and reports the result as
//! a [`VerificationOutcome`]. [`AddressRecord`] is the storefront side: it
//! decides when to call the client and copies normalized fields back.

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod record;
pub mod transport;

pub use client::{VerificationClient, VerificationOutcome, Verifier};
pub use config::{ClientConfig, Credentials};
pub use error::VerifyError;
pub use model::{AddressInput, Verification, VerifiedAddress};
pub use record::{AddressRecord, RecordError};
pub use transport::{HttpResponse, Transport, UreqTransport};
