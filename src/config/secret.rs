//! Private key material for encrypted forms
//!
//! The PEM text is wrapped in a [`secrecy::Secret`] so it is zeroed on drop
//! and redacted from `Debug` output.

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// PEM text of a form's private key
#[derive(Clone, Zeroize, Serialize, Deserialize)]
#[serde(transparent)]
#[zeroize(drop)]
pub struct KeyMaterial(String);

impl KeyMaterial {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CloneableSecret for KeyMaterial {}
impl DebugSecret for KeyMaterial {}
impl SerializableSecret for KeyMaterial {}

pub type SecretString = Secret<KeyMaterial>;

#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(KeyMaterial(value))
}
