//! Release conditions and deterministic proof checking.
//!
//! A swap carries an opaque [`ConditionTag`]; the engine only ever asks a
//! [`ConditionChecker`] whether a caller-supplied [`Proof`] satisfies it.
//! Tags are keyed into a closed set of families by prefix:
//!
//! - `preimage:<64 hex chars>` — SHA-256 hashlock,
//! - `external:<name>` — delegated to a host-supplied capability,
//! - anything else — a fixed keyword the proof must match.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::ValidationError;

/// Maximum byte length of a condition tag.
pub const MAX_CONDITION_LEN: usize = 128;

const PREIMAGE_PREFIX: &str = "preimage:";
const EXTERNAL_PREFIX: &str = "external:";

/// Opaque, bounded-length tag identifying a swap's release condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ConditionTag(String);

impl ConditionTag {
    /// Parse and bound-check a tag.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCondition`] if the tag is empty,
    /// exceeds [`MAX_CONDITION_LEN`] bytes, or names a family with a
    /// malformed payload.
    pub fn new(tag: impl Into<String>) -> Result<Self, ValidationError> {
        let tag = Self(tag.into());
        tag.family()?;
        Ok(tag)
    }

    /// The raw tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the tag into its condition family.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCondition`] on a malformed tag,
    /// e.g. one constructed through deserialization.
    pub fn family(&self) -> Result<ConditionFamily<'_>, ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::InvalidCondition(
                "tag must be non-empty".into(),
            ));
        }
        if self.0.len() > MAX_CONDITION_LEN {
            return Err(ValidationError::InvalidCondition(format!(
                "tag exceeds {} bytes",
                MAX_CONDITION_LEN
            )));
        }

        if let Some(encoded) = self.0.strip_prefix(PREIMAGE_PREFIX) {
            let bytes = hex::decode(encoded)
                .map_err(|e| ValidationError::InvalidCondition(format!("bad hashlock hex: {e}")))?;
            let hash: [u8; 32] = bytes.try_into().map_err(|_| {
                ValidationError::InvalidCondition("hashlock must be 32 bytes".into())
            })?;
            return Ok(ConditionFamily::Preimage { hash });
        }

        if let Some(name) = self.0.strip_prefix(EXTERNAL_PREFIX) {
            if name.is_empty() {
                return Err(ValidationError::InvalidCondition(
                    "external condition must be named".into(),
                ));
            }
            return Ok(ConditionFamily::External(name));
        }

        Ok(ConditionFamily::Keyword(&self.0))
    }

    /// Build a hashlock tag from a SHA-256 digest.
    pub fn hashlock(hash: [u8; 32]) -> Self {
        Self(format!("{}{}", PREIMAGE_PREFIX, hex::encode(hash)))
    }
}

impl std::fmt::Display for ConditionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of condition families a tag can resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionFamily<'a> {
    /// SHA-256 hashlock; satisfied by revealing the preimage.
    Preimage { hash: [u8; 32] },
    /// Fixed keyword; satisfied by echoing the keyword.
    Keyword(&'a str),
    /// Named check delegated to the host.
    External(&'a str),
}

/// Caller-supplied evidence that a condition holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "proof_type", rename_all = "snake_case")]
pub enum Proof {
    /// Preimage for a hashlock condition.
    Preimage {
        #[serde(with = "hex::serde")]
        preimage: Vec<u8>,
    },
    /// Keyword echo for a keyword condition.
    Keyword { keyword: String },
    /// Opaque payload for an externally delegated condition.
    External {
        #[serde(with = "hex::serde")]
        data: Vec<u8>,
    },
}

/// Side-effect-free condition evaluation.
///
/// Implementations must be fast and deterministic; the engine calls them
/// inline while deciding a transition and never retries.
pub trait ConditionChecker: Send + Sync {
    /// Whether `proof` satisfies `condition`.
    fn satisfies(&self, condition: &ConditionTag, proof: &Proof) -> bool;
}

/// Host-delegated check for `external:<name>` conditions.
pub trait ExternalCondition: Send + Sync {
    /// Whether `proof` satisfies the external condition `name`.
    fn satisfies(&self, name: &str, proof: &[u8]) -> bool;
}

/// Default checker covering the built-in condition families.
///
/// External conditions are rejected unless a delegate is supplied.
#[derive(Default, Clone)]
pub struct StandardChecker {
    external: Option<Arc<dyn ExternalCondition>>,
}

impl StandardChecker {
    /// Checker for the built-in families only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checker that delegates `external:` tags to `external`.
    pub fn with_external(external: Arc<dyn ExternalCondition>) -> Self {
        Self {
            external: Some(external),
        }
    }
}

impl ConditionChecker for StandardChecker {
    fn satisfies(&self, condition: &ConditionTag, proof: &Proof) -> bool {
        let Ok(family) = condition.family() else {
            return false;
        };
        match (family, proof) {
            (ConditionFamily::Preimage { hash }, Proof::Preimage { preimage }) => {
                let computed = Sha256::digest(preimage);
                computed.as_slice().ct_eq(&hash).unwrap_u8() == 1
            }
            (ConditionFamily::Keyword(keyword), Proof::Keyword { keyword: echoed }) => {
                keyword.as_bytes().ct_eq(echoed.as_bytes()).unwrap_u8() == 1
            }
            (ConditionFamily::External(name), Proof::External { data }) => self
                .external
                .as_ref()
                .is_some_and(|ext| ext.satisfies(name, data)),
            // Proof shape does not match the condition family.
            _ => false,
        }
    }
}
