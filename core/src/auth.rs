//! Cancellation authorization.
//!
//! Cancelling a pending swap returns the source-side lock early, so it
//! must be authorized. The engine delegates the decision to a
//! [`CancelPolicy`]; the built-in [`KeyCancelPolicy`] accepts a signature
//! over the canonical cancel message from an allow-listed key.

use ed25519_dalek::{Signature as Ed25519Sig, Verifier, VerifyingKey as Ed25519Pub};
use k256::ecdsa::{Signature as Secp256k1Sig, VerifyingKey as Secp256k1Pub};
use serde::{Deserialize, Serialize};

use crate::swap::{SwapId, SwapRecord};

/// Caller-supplied proof of authority to cancel a swap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum Authorization {
    /// Ed25519 signature over [`cancel_message`].
    Ed25519 {
        #[serde(with = "hex::serde")]
        public_key: [u8; 32],
        #[serde(with = "hex::serde")]
        signature: Vec<u8>,
    },
    /// Secp256k1 ECDSA signature (DER) over [`cancel_message`],
    /// with a SEC1-encoded public key.
    Secp256k1 {
        #[serde(with = "hex::serde")]
        public_key: Vec<u8>,
        #[serde(with = "hex::serde")]
        signature: Vec<u8>,
    },
}

/// Canonical message a cancellation authority signs for swap `id`.
pub fn cancel_message(id: SwapId) -> Vec<u8> {
    format!("chainswap:cancel:{id}").into_bytes()
}

/// Decides whether an [`Authorization`] may cancel a given swap.
pub trait CancelPolicy: Send + Sync {
    /// Whether `auth` authorizes cancellation of `record`.
    fn authorize(&self, record: &SwapRecord, auth: &Authorization) -> bool;
}

/// Allow-list policy: a cancellation is authorized by a valid signature
/// over [`cancel_message`] from one of the configured keys.
#[derive(Debug, Clone, Default)]
pub struct KeyCancelPolicy {
    ed25519_keys: Vec<[u8; 32]>,
    secp256k1_keys: Vec<Vec<u8>>,
}

impl KeyCancelPolicy {
    /// Policy with an empty allow-list (denies everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow cancellations signed by this Ed25519 key.
    pub fn allow_ed25519(mut self, public_key: [u8; 32]) -> Self {
        self.ed25519_keys.push(public_key);
        self
    }

    /// Allow cancellations signed by this SEC1-encoded secp256k1 key.
    pub fn allow_secp256k1(mut self, public_key: Vec<u8>) -> Self {
        self.secp256k1_keys.push(public_key);
        self
    }
}

impl CancelPolicy for KeyCancelPolicy {
    fn authorize(&self, record: &SwapRecord, auth: &Authorization) -> bool {
        let message = cancel_message(record.id);
        match auth {
            Authorization::Ed25519 {
                public_key,
                signature,
            } => {
                self.ed25519_keys.contains(public_key)
                    && verify_ed25519(public_key, signature, &message)
            }
            Authorization::Secp256k1 {
                public_key,
                signature,
            } => {
                self.secp256k1_keys.contains(public_key)
                    && verify_secp256k1(public_key, signature, &message)
            }
        }
    }
}

fn verify_ed25519(public_key: &[u8; 32], signature: &[u8], message: &[u8]) -> bool {
    let Ok(pk) = Ed25519Pub::from_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = Ed25519Sig::from_slice(signature) else {
        return false;
    };
    pk.verify(message, &sig).is_ok()
}

fn verify_secp256k1(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let Ok(vk) = Secp256k1Pub::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = Secp256k1Sig::from_der(signature) else {
        return false;
    };
    vk.verify(message, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::ed25519::signature::rand_core::OsRng;
    use ed25519_dalek::{Signer, SigningKey};

    use super::*;
    use crate::condition::ConditionTag;
    use crate::swap::SwapProposal;

    fn record(id: SwapId) -> SwapRecord {
        let proposal = SwapProposal {
            source_amount: 100,
            target_amount: 200,
            expiration_height: 1000,
            price: 2,
            condition: ConditionTag::new("HODL").unwrap(),
            fee_bps: 0,
        };
        SwapRecord::from_proposal(id, proposal, 1)
    }

    fn signed_ed25519(sk: &SigningKey, id: SwapId) -> Authorization {
        Authorization::Ed25519 {
            public_key: sk.verifying_key().to_bytes(),
            signature: sk.sign(&cancel_message(id)).to_bytes().to_vec(),
        }
    }

    #[test]
    fn ed25519_allow_list() {
        let mut csprng = OsRng;
        let sk = SigningKey::generate(&mut csprng);
        let policy = KeyCancelPolicy::new().allow_ed25519(sk.verifying_key().to_bytes());

        assert!(policy.authorize(&record(1), &signed_ed25519(&sk, 1)));

        // signature for a different swap id does not transfer
        assert!(!policy.authorize(&record(2), &signed_ed25519(&sk, 1)));

        // valid signature from a key outside the allow-list
        let stranger = SigningKey::generate(&mut csprng);
        assert!(!policy.authorize(&record(1), &signed_ed25519(&stranger, 1)));
    }

    #[test]
    fn ed25519_tampered_signature() {
        let mut csprng = OsRng;
        let sk = SigningKey::generate(&mut csprng);
        let policy = KeyCancelPolicy::new().allow_ed25519(sk.verifying_key().to_bytes());

        let Authorization::Ed25519 {
            public_key,
            mut signature,
        } = signed_ed25519(&sk, 1)
        else {
            unreachable!()
        };
        signature[0] ^= 0xFF;
        let auth = Authorization::Ed25519 {
            public_key,
            signature,
        };
        assert!(!policy.authorize(&record(1), &auth));
    }

    #[test]
    fn secp256k1_allow_list() {
        use k256::ecdsa::signature::Signer;
        use k256::ecdsa::{Signature, SigningKey};
        use k256::elliptic_curve::rand_core::OsRng;

        let sk = SigningKey::random(&mut OsRng);
        let pk_bytes = sk.verifying_key().to_encoded_point(false).as_bytes().to_vec();
        let policy = KeyCancelPolicy::new().allow_secp256k1(pk_bytes.clone());

        let signature: Signature = sk.sign(&cancel_message(7));
        let auth = Authorization::Secp256k1 {
            public_key: pk_bytes.clone(),
            signature: signature.to_der().as_bytes().to_vec(),
        };
        assert!(policy.authorize(&record(7), &auth));
        assert!(!policy.authorize(&record(8), &auth));

        // empty allow-list denies even a valid signature
        assert!(!KeyCancelPolicy::new().authorize(&record(7), &auth));
    }

    #[test]
    fn garbage_key_material() {
        let policy = KeyCancelPolicy::new().allow_secp256k1(vec![0u8; 3]);
        let auth = Authorization::Secp256k1 {
            public_key: vec![0u8; 3],
            signature: vec![1, 2, 3],
        };
        assert!(!policy.authorize(&record(1), &auth));
    }
}
