//! Credential verification and extraction of the authenticated player.

mod credentials;
mod extract;

pub use credentials::{Claims, CredentialError, CredentialVerifier, HmacCredentials, Principal};
pub use extract::{AuthenticatedPlayer, authenticate};
