//! Key material and the versioned key store
//!
//! Keys are immutable once issued. The store holds an ordered set behind a
//! copy-on-write handle: readers take a [`KeySetSnapshot`] and resolve every
//! key of one operation against that single version, while
//! [`KeyStore::replace`] swaps the whole set atomically for key rollover.
//! No reader ever observes a partially updated set.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::JoseError;
use crate::Result;

/// Intended key usage, mirroring the JWK `use` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyUse {
    /// Signature keys (`use: "sig"`)
    #[serde(rename = "sig")]
    Signature,
    /// Encryption keys (`use: "enc"`)
    #[serde(rename = "enc")]
    Encryption,
}

impl KeyUse {
    /// The JWK `use` parameter value
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "sig",
            Self::Encryption => "enc",
        }
    }
}

impl std::fmt::Display for KeyUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key material for a single JSON Web Key
///
/// Private parts are zeroized on drop to limit memory disclosure.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// RSA key; private key, when present, is PKCS#1 DER
    Rsa {
        /// Modulus, big-endian
        n: Vec<u8>,
        /// Public exponent, big-endian
        e: Vec<u8>,
        /// PKCS#1 DER private key, absent for public-only keys
        private_der: Option<Vec<u8>>,
    },
    /// ECDSA P-256 key
    EcP256 {
        /// X coordinate of the public point
        x: [u8; 32],
        /// Y coordinate of the public point
        y: [u8; 32],
        /// SEC1 scalar, absent for public-only keys
        private: Option<[u8; 32]>,
    },
}

impl Zeroize for KeyMaterial {
    fn zeroize(&mut self) {
        match self {
            Self::Rsa { private_der, .. } => {
                if let Some(der) = private_der {
                    der.zeroize();
                }
            }
            Self::EcP256 { private, .. } => {
                if let Some(scalar) = private {
                    scalar.zeroize();
                }
            }
        }
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// A single key in the store: material plus JWK metadata
///
/// Immutable once issued; rollover replaces whole keys, never mutates them.
#[derive(Debug, Clone)]
pub struct JsonWebKey {
    /// Key identifier, unique within one store version
    pub kid: String,
    /// Intended usage
    pub key_use: KeyUse,
    /// Algorithm label this key is bound to (e.g. "RS256", "RSA-OAEP")
    pub alg: Option<String>,
    /// The key material
    pub material: KeyMaterial,
}

impl JsonWebKey {
    /// Generate a fresh RSA-2048 key
    ///
    /// # Errors
    /// [`JoseError::CryptoFailure`] if key generation or DER encoding fails
    pub fn generate_rsa(kid: impl Into<String>, key_use: KeyUse, alg: &str) -> Result<Self> {
        let mut rng = OsRng;
        let private_key =
            rsa::RsaPrivateKey::new(&mut rng, 2048).map_err(|e| JoseError::CryptoFailure {
                reason: format!("RSA key generation failed: {e}"),
            })?;
        let public_key = rsa::RsaPublicKey::from(&private_key);

        let private_der = private_key
            .to_pkcs1_der()
            .map_err(|e| JoseError::CryptoFailure {
                reason: format!("RSA PKCS#1 encoding failed: {e}"),
            })?;

        Ok(Self {
            kid: kid.into(),
            key_use,
            alg: Some(alg.to_string()),
            material: KeyMaterial::Rsa {
                n: public_key.n().to_bytes_be(),
                e: public_key.e().to_bytes_be(),
                private_der: Some(private_der.as_bytes().to_vec()),
            },
        })
    }

    /// Generate a fresh P-256 signing key (ES256)
    ///
    /// # Errors
    /// [`JoseError::CryptoFailure`] if coordinate extraction fails
    pub fn generate_p256(kid: impl Into<String>) -> Result<Self> {
        let signing_key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let verifying_key = p256::ecdsa::VerifyingKey::from(&signing_key);

        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(signing_key.to_bytes().as_ref());

        let point = verifying_key.to_encoded_point(false);
        let (x_bytes, y_bytes) = match (point.x(), point.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(JoseError::CryptoFailure {
                    reason: "failed to extract P-256 public coordinates".to_string(),
                })
            }
        };
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(x_bytes);
        y.copy_from_slice(y_bytes);

        Ok(Self {
            kid: kid.into(),
            key_use: KeyUse::Signature,
            alg: Some("ES256".to_string()),
            material: KeyMaterial::EcP256 {
                x,
                y,
                private: Some(scalar),
            },
        })
    }

    /// Whether this key carries private material
    pub fn is_private(&self) -> bool {
        match &self.material {
            KeyMaterial::Rsa { private_der, .. } => private_der.is_some(),
            KeyMaterial::EcP256 { private, .. } => private.is_some(),
        }
    }

    /// Whether this key matches a selector (absent selector fields match all)
    pub fn matches(&self, selector: &KeySelector) -> bool {
        if let Some(key_use) = selector.key_use {
            if self.key_use != key_use {
                return false;
            }
        }
        if let Some(ref alg) = selector.alg {
            if self.alg.as_deref() != Some(alg.as_str()) {
                return false;
            }
        }
        if let Some(ref kid) = selector.kid {
            if &self.kid != kid {
                return false;
            }
        }
        true
    }

    /// The public-only JWK representation, safe for publication
    pub fn to_public_jwk(&self) -> PublicJwk {
        match &self.material {
            KeyMaterial::Rsa { n, e, .. } => PublicJwk::Rsa {
                kid: self.kid.clone(),
                key_use: self.key_use,
                alg: self.alg.clone(),
                n: URL_SAFE_NO_PAD.encode(n),
                e: URL_SAFE_NO_PAD.encode(e),
            },
            KeyMaterial::EcP256 { x, y, .. } => PublicJwk::Ec {
                kid: self.kid.clone(),
                key_use: self.key_use,
                alg: self.alg.clone(),
                crv: "P-256".to_string(),
                x: URL_SAFE_NO_PAD.encode(x),
                y: URL_SAFE_NO_PAD.encode(y),
            },
        }
    }
}

/// Predicate for key lookup; `None` fields are wildcards
#[derive(Debug, Clone, Default)]
pub struct KeySelector {
    /// Required key usage
    pub key_use: Option<KeyUse>,
    /// Required algorithm label
    pub alg: Option<String>,
    /// Required key identifier
    pub kid: Option<String>,
}

impl KeySelector {
    /// Selector for outbound/inbound lookup by usage and algorithm label
    pub fn by_alg(key_use: KeyUse, alg: &str) -> Self {
        Self {
            key_use: Some(key_use),
            alg: Some(alg.to_string()),
            kid: None,
        }
    }

    /// Selector for inbound lookup by key identifier
    pub fn by_kid(kid: &str) -> Self {
        Self {
            key_use: None,
            alg: None,
            kid: Some(kid.to_string()),
        }
    }
}

/// One consistent version of the key set
///
/// Cheap to clone; selection is a pure function of (selector, snapshot).
#[derive(Debug, Clone)]
pub struct KeySetSnapshot {
    keys: Arc<Vec<Arc<JsonWebKey>>>,
}

impl KeySetSnapshot {
    /// First key matching the selector, in store order
    pub fn select(&self, selector: &KeySelector) -> Option<Arc<JsonWebKey>> {
        self.keys.iter().find(|k| k.matches(selector)).cloned()
    }

    /// Whether at least one key matches usage and algorithm label
    pub fn has_key(&self, key_use: KeyUse, alg: &str) -> bool {
        self.select(&KeySelector::by_alg(key_use, alg)).is_some()
    }

    /// Number of keys in this version
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether this version is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Versioned key store with atomic whole-set replacement
///
/// Concurrent `select`/`snapshot` calls are lock-free reads; `replace`
/// publishes a new version without disturbing operations that already hold
/// a snapshot.
#[derive(Debug)]
pub struct KeyStore {
    active: ArcSwap<Vec<Arc<JsonWebKey>>>,
}

impl KeyStore {
    /// Build a store from an ordered key set
    ///
    /// # Errors
    /// [`JoseError::InvalidConfiguration`] if two keys share a `kid`
    pub fn new(keys: Vec<JsonWebKey>) -> Result<Self> {
        let keys = Self::validate(keys)?;
        Ok(Self {
            active: ArcSwap::from_pointee(keys),
        })
    }

    /// Take the current version; all lookups of one operation should go
    /// through a single snapshot
    pub fn snapshot(&self) -> KeySetSnapshot {
        KeySetSnapshot {
            keys: self.active.load_full(),
        }
    }

    /// First key matching the selector in the current version
    pub fn select(&self, selector: &KeySelector) -> Option<Arc<JsonWebKey>> {
        self.snapshot().select(selector)
    }

    /// Atomically replace the entire active set (key rollover)
    ///
    /// Operations already holding a snapshot are unaffected.
    ///
    /// # Errors
    /// [`JoseError::InvalidConfiguration`] if two keys share a `kid`
    pub fn replace(&self, keys: Vec<JsonWebKey>) -> Result<()> {
        let keys = Self::validate(keys)?;
        self.active.store(Arc::new(keys));
        tracing::debug!("key store rolled over");
        Ok(())
    }

    /// Export the public-only subset as a standard JWK Set
    ///
    /// Never includes private material.
    pub fn export_public(&self) -> PublicJwkSet {
        PublicJwkSet {
            keys: self
                .snapshot()
                .keys
                .iter()
                .map(|k| k.to_public_jwk())
                .collect(),
        }
    }

    fn validate(keys: Vec<JsonWebKey>) -> Result<Vec<Arc<JsonWebKey>>> {
        let mut seen = HashSet::new();
        for key in &keys {
            if !seen.insert(key.kid.as_str()) {
                return Err(JoseError::InvalidConfiguration {
                    reason: format!("duplicate key id '{}'", key.kid),
                });
            }
        }
        Ok(keys.into_iter().map(Arc::new).collect())
    }
}

/// Public-only JWK, RFC 7517 shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kty")]
pub enum PublicJwk {
    /// RSA public key
    #[serde(rename = "RSA")]
    Rsa {
        kid: String,
        #[serde(rename = "use")]
        key_use: KeyUse,
        #[serde(skip_serializing_if = "Option::is_none")]
        alg: Option<String>,
        /// Modulus, base64url
        n: String,
        /// Public exponent, base64url
        e: String,
    },
    /// EC P-256 public key
    #[serde(rename = "EC")]
    Ec {
        kid: String,
        #[serde(rename = "use")]
        key_use: KeyUse,
        #[serde(skip_serializing_if = "Option::is_none")]
        alg: Option<String>,
        crv: String,
        /// X coordinate, base64url
        x: String,
        /// Y coordinate, base64url
        y: String,
    },
}

/// A standard JWK Set document containing only public material
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicJwkSet {
    /// The keys, in store order
    pub keys: Vec<PublicJwk>,
}
