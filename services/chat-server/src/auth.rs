//! Credential handling is kept behind a trait so the storage format can
//! change without touching the LOGIN wire contract (spec design note: the
//! source compares plaintext; a reimplementation must not bake that in).

use rand::Rng;
use sha2::{Digest, Sha256};

pub trait CredentialVerifier: Send + Sync + 'static {
    /// Turns a plaintext password into whatever gets stored in `users.password`.
    fn hash(&self, plaintext: &str) -> String;
    /// Compares a plaintext password against the stored credential.
    fn verify(&self, plaintext: &str, stored: &str) -> bool;
}

/// Matches the original source: the stored credential *is* the plaintext
/// password, compared by equality.
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn hash(&self, plaintext: &str) -> String {
        plaintext.to_owned()
    }

    fn verify(&self, plaintext: &str, stored: &str) -> bool {
        plaintext == stored
    }
}

/// Demonstrates that swapping verifiers doesn't touch the LOGIN wire
/// contract: still `{account,password}` in, still `LOGIN_FAILED` on
/// mismatch.
pub struct Sha256Verifier;

impl CredentialVerifier for Sha256Verifier {
    fn hash(&self, plaintext: &str) -> String {
        hex::encode(Sha256::digest(plaintext.as_bytes()))
    }

    fn verify(&self, plaintext: &str, stored: &str) -> bool {
        self.hash(plaintext) == stored
    }
}

const NAME_ADJECTIVES: &[&str] = &[
    "Swift", "Quiet", "Brave", "Lucky", "Clever", "Gentle", "Bold", "Calm", "Eager", "Keen",
];
const NAME_NOUNS: &[&str] = &[
    "Falcon", "River", "Cedar", "Comet", "Otter", "Harbor", "Ember", "Willow", "Fox", "Maple",
];

/// Random display name assigned at registration, replacing the account
/// string the client supplied for login with something presentable.
pub fn random_display_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = NAME_ADJECTIVES[rng.gen_range(0..NAME_ADJECTIVES.len())];
    let noun = NAME_NOUNS[rng.gen_range(0..NAME_NOUNS.len())];
    let suffix: u16 = rng.gen_range(0..10_000);
    format!("{adjective}{noun}{suffix:04}")
}
