//! Algorithm labels and negotiation
//!
//! The IdP advertises per-purpose ordered algorithm lists in its metadata;
//! the relying party intersects them with the keys it actually holds.
//! [`negotiate`] is deliberately a first-match scan in the IdP's given order:
//! the relying party defers to the IdP's stated preference, so the list is
//! never reordered or parallelized.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::JoseError;
use crate::Result;

/// Common surface of the algorithm label enums
pub trait JoseAlgorithm: Copy + Sized {
    /// Parse an IANA algorithm label; `None` for labels this relying party
    /// does not implement (the negotiator skips those, it does not fail)
    fn from_label(label: &str) -> Option<Self>;

    /// The IANA label
    fn label(self) -> &'static str;
}

/// JWS signing algorithms supported by the relying party (RFC 7518)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JwsAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    #[serde(rename = "RS256")]
    Rs256,
    /// RSASSA-PSS with SHA-256
    #[serde(rename = "PS256")]
    Ps256,
    /// ECDSA with P-256 and SHA-256
    #[serde(rename = "ES256")]
    Es256,
}

impl JwsAlgorithm {
    /// Map to the `jsonwebtoken` algorithm used for the actual primitive
    pub fn to_jwt(self) -> jsonwebtoken::Algorithm {
        match self {
            Self::Rs256 => jsonwebtoken::Algorithm::RS256,
            Self::Ps256 => jsonwebtoken::Algorithm::PS256,
            Self::Es256 => jsonwebtoken::Algorithm::ES256,
        }
    }

    /// Map back from a `jsonwebtoken` header algorithm
    pub fn from_jwt(alg: jsonwebtoken::Algorithm) -> Option<Self> {
        match alg {
            jsonwebtoken::Algorithm::RS256 => Some(Self::Rs256),
            jsonwebtoken::Algorithm::PS256 => Some(Self::Ps256),
            jsonwebtoken::Algorithm::ES256 => Some(Self::Es256),
            _ => None,
        }
    }
}

impl JoseAlgorithm for JwsAlgorithm {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "RS256" => Some(Self::Rs256),
            "PS256" => Some(Self::Ps256),
            "ES256" => Some(Self::Es256),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Ps256 => "PS256",
            Self::Es256 => "ES256",
        }
    }
}

impl fmt::Display for JwsAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// JWE key-management algorithms supported by the relying party (RFC 7518)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JweAlgorithm {
    /// RSAES-OAEP with SHA-1 (the RFC 7518 default OAEP variant)
    #[serde(rename = "RSA-OAEP")]
    RsaOaep,
    /// RSAES-OAEP with SHA-256
    #[serde(rename = "RSA-OAEP-256")]
    RsaOaep256,
}

impl JoseAlgorithm for JweAlgorithm {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "RSA-OAEP" => Some(Self::RsaOaep),
            "RSA-OAEP-256" => Some(Self::RsaOaep256),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::RsaOaep => "RSA-OAEP",
            Self::RsaOaep256 => "RSA-OAEP-256",
        }
    }
}

impl fmt::Display for JweAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// JWE content-encryption methods supported by the relying party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentEncryption {
    /// AES-128-GCM
    #[serde(rename = "A128GCM")]
    A128Gcm,
    /// AES-256-GCM
    #[serde(rename = "A256GCM")]
    A256Gcm,
}

impl ContentEncryption {
    /// Content-encryption key length in bytes
    pub fn key_len(self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A256Gcm => 32,
        }
    }
}

impl JoseAlgorithm for ContentEncryption {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "A128GCM" => Some(Self::A128Gcm),
            "A256GCM" => Some(Self::A256Gcm),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::A128Gcm => "A128GCM",
            Self::A256Gcm => "A256GCM",
        }
    }
}

impl fmt::Display for ContentEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Select the first advertised algorithm the relying party can actually use.
///
/// `advertised` is scanned in order; labels that do not parse or for which
/// `available` returns false are skipped. The first surviving entry wins.
///
/// # Errors
/// [`JoseError::NoMatchingAlgorithm`] when the scan is exhausted.
pub fn negotiate<A, F>(advertised: &[String], available: F) -> Result<A>
where
    A: JoseAlgorithm,
    F: Fn(A) -> bool,
{
    advertised
        .iter()
        .filter_map(|label| A::from_label(label))
        .find(|alg| available(*alg))
        .ok_or_else(|| JoseError::NoMatchingAlgorithm {
            advertised: advertised.to_vec(),
        })
}
