//! JWS/JWE compact token codec
//!
//! Produces and consumes compact-serialized tokens against the key store:
//!
//! - [`TokenCodec::sign`] / [`TokenCodec::verify`] - three-part JWS
//! - [`TokenCodec::encrypt`] / [`TokenCodec::decrypt`] - five-part JWE
//!
//! Inbound processing order is fixed: header inspection, allow-list check,
//! key resolution, cryptographic check, and (for `verify`) claims
//! validation. The allow-list check runs before any key is resolved so an
//! attacker-controlled header algorithm is never trusted.
//!
//! JWS mechanics are delegated to `jsonwebtoken`; JWE content encryption
//! uses AES-GCM with the protected header as additional authenticated data
//! and RSA-OAEP key wrapping.

use std::collections::HashSet;
use std::sync::Arc;

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::Oaep;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::alg::{negotiate, ContentEncryption, JoseAlgorithm, JweAlgorithm, JwsAlgorithm};
use crate::claims::{ClaimsMap, ClaimsValidator};
use crate::error::JoseError;
use crate::key::{JsonWebKey, KeyMaterial, KeySelector, KeySetSnapshot, KeyStore, KeyUse};
use crate::{Result, JWT_TYPE};

/// AES-GCM initialization vector length (RFC 7518 §5.3)
const GCM_IV_LEN: usize = 12;
/// AES-GCM authentication tag length
const GCM_TAG_LEN: usize = 16;

/// Protected header of a compact JWE
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JweHeader {
    alg: String,
    enc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cty: Option<String>,
}

/// Signs, encrypts, verifies, and decrypts compact tokens
///
/// Each operation resolves every key against a single [`KeySetSnapshot`], so
/// a concurrent rollover never mixes old and new keys within one call.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: Arc<KeyStore>,
}

impl TokenCodec {
    /// Create a codec over a shared key store
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self { keys }
    }

    /// The underlying key store
    pub fn key_store(&self) -> &Arc<KeyStore> {
        &self.keys
    }

    /// Produce a compact JWS over the claims
    ///
    /// Negotiates the signing algorithm against the IdP-advertised list and
    /// the `use=sig` keys, then emits a header `{alg, typ: "JWT", kid}`.
    ///
    /// # Errors
    /// [`JoseError::NoMatchingAlgorithm`] / [`JoseError::NoMatchingKey`] when
    /// negotiation or selection fails.
    pub fn sign(&self, claims: &ClaimsMap, signing_algs: &[String]) -> Result<String> {
        let snapshot = self.keys.snapshot();
        let alg = negotiate(signing_algs, |a: JwsAlgorithm| {
            snapshot.has_key(KeyUse::Signature, a.label())
        })?;
        let key = select_for(&snapshot, KeyUse::Signature, alg.label())?;

        let mut header = Header::new(alg.to_jwt());
        header.typ = Some(JWT_TYPE.to_string());
        header.kid = Some(key.kid.clone());

        let token = jsonwebtoken::encode(&header, claims, &encoding_key(&key)?).map_err(|e| {
            JoseError::CryptoFailure {
                reason: format!("JWS signing failed: {e}"),
            }
        })?;

        tracing::debug!(alg = %alg, kid = %key.kid, "signed compact JWS");
        Ok(token)
    }

    /// Verify a compact JWS and validate its claims
    ///
    /// Processing order: untrusted header/payload parse, algorithm
    /// allow-list, key resolution (`kid` first, else `alg` + `use=sig`),
    /// signature check, claims validation.
    pub fn verify(
        &self,
        token: &str,
        supported_algs: &[String],
        validator: &ClaimsValidator,
        required: &[&str],
    ) -> Result<ClaimsMap> {
        self.verify_pinned(&self.keys.snapshot(), token, supported_algs, validator, required)
    }

    /// [`TokenCodec::verify`] against a previously captured key-set version
    ///
    /// For pipelines spanning several steps: capture one snapshot up front
    /// and every verification in the pipeline sees the same keys even if a
    /// rollover lands in between.
    pub fn verify_pinned(
        &self,
        snapshot: &KeySetSnapshot,
        token: &str,
        supported_algs: &[String],
        validator: &ClaimsValidator,
        required: &[&str],
    ) -> Result<ClaimsMap> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| JoseError::MalformedToken {
            reason: format!("JWS header: {e}"),
        })?;

        // The header is attacker-controlled until the signature is checked;
        // the algorithm must pass the caller's allow-list before it is used
        // for anything, including key lookup.
        let alg = JwsAlgorithm::from_jwt(header.alg)
            .filter(|a| supported_algs.iter().any(|l| l == a.label()))
            .ok_or_else(|| JoseError::NoMatchingAlgorithm {
                advertised: supported_algs.to_vec(),
            })?;

        let payload = parse_jws_payload(token)?;

        let key = match header.kid.as_deref() {
            Some(kid) => snapshot.select(&KeySelector::by_kid(kid)),
            None => snapshot.select(&KeySelector::by_alg(KeyUse::Signature, alg.label())),
        }
        .ok_or_else(|| JoseError::NoMatchingKey {
            key_use: KeyUse::Signature.to_string(),
            alg: alg.label().to_string(),
        })?;

        let mut validation = Validation::new(alg.to_jwt());
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        // Claim checks are disabled above; this decode is purely the
        // cryptographic signature check. Claims validation follows with
        // first-violation semantics the library does not provide.
        jsonwebtoken::decode::<serde_json::Value>(token, &decoding_key(&key)?, &validation)
            .map_err(|e| {
                tracing::debug!(alg = %alg, kid = %key.kid, error = %e, "signature check failed");
                JoseError::SignatureVerificationFailed
            })?;

        validator.validate(payload, required)
    }

    /// Produce a compact JWE over the plaintext
    ///
    /// The content-encryption method is the first entry of `enc_methods`;
    /// any key matching the negotiated key-management algorithm is assumed
    /// to support it (always true for the RSA-OAEP family, where the CEK is
    /// an arbitrary random octet string).
    ///
    /// # Errors
    /// [`JoseError::InvalidConfiguration`] when `enc_methods` is empty.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        enc_algs: &[String],
        enc_methods: &[String],
        cty: Option<&str>,
    ) -> Result<String> {
        if enc_methods.is_empty() {
            return Err(JoseError::InvalidConfiguration {
                reason: "encryption-method list is empty".to_string(),
            });
        }

        let snapshot = self.keys.snapshot();
        let alg = negotiate(enc_algs, |a: JweAlgorithm| {
            snapshot.has_key(KeyUse::Encryption, a.label())
        })?;
        let enc = ContentEncryption::from_label(&enc_methods[0]).ok_or_else(|| {
            JoseError::NoMatchingAlgorithm {
                advertised: enc_methods.to_vec(),
            }
        })?;
        let key = select_for(&snapshot, KeyUse::Encryption, alg.label())?;
        let public_key = rsa_public(&key)?;

        let mut cek = Zeroizing::new(vec![0u8; enc.key_len()]);
        OsRng.fill_bytes(&mut cek);
        let encrypted_key = public_key
            .encrypt(&mut OsRng, oaep_padding(alg), &cek)
            .map_err(|e| JoseError::CryptoFailure {
                reason: format!("CEK wrap failed: {e}"),
            })?;

        let header = JweHeader {
            alg: alg.label().to_string(),
            enc: enc.label().to_string(),
            kid: Some(key.kid.clone()),
            cty: cty.map(str::to_string),
        };
        let header_json = serde_json::to_vec(&header).map_err(|e| JoseError::CryptoFailure {
            reason: format!("JWE header serialization failed: {e}"),
        })?;
        let protected = URL_SAFE_NO_PAD.encode(header_json);

        let mut iv = [0u8; GCM_IV_LEN];
        OsRng.fill_bytes(&mut iv);

        // The protected header segment, exactly as transmitted, is the AAD.
        let sealed = seal(enc, &cek, &iv, plaintext, protected.as_bytes())?;
        let (ciphertext, tag) = sealed.split_at(sealed.len() - GCM_TAG_LEN);

        tracing::debug!(alg = %alg, enc = %enc, kid = %key.kid, "produced compact JWE");
        Ok(format!(
            "{protected}.{}.{}.{}.{}",
            URL_SAFE_NO_PAD.encode(encrypted_key),
            URL_SAFE_NO_PAD.encode(iv),
            URL_SAFE_NO_PAD.encode(ciphertext),
            URL_SAFE_NO_PAD.encode(tag),
        ))
    }

    /// Decrypt a compact JWE and return the plaintext, unvalidated
    ///
    /// Claims validation is a separate subsequent step; the usual pattern is
    /// to run [`TokenCodec::verify`] on the decrypted nested JWS.
    pub fn decrypt(&self, token: &str, supported_algs: &[String]) -> Result<String> {
        let snapshot = self.keys.snapshot();

        let parts: Vec<&str> = token.split('.').collect();
        let [protected, encrypted_key, iv, ciphertext, tag] = parts.as_slice() else {
            return Err(JoseError::MalformedToken {
                reason: format!("expected 5 JWE segments, got {}", parts.len()),
            });
        };

        let header_bytes = decode_segment(protected, "JWE header")?;
        let header: JweHeader =
            serde_json::from_slice(&header_bytes).map_err(|e| JoseError::MalformedToken {
                reason: format!("JWE header: {e}"),
            })?;

        let alg = JweAlgorithm::from_label(&header.alg)
            .filter(|a| supported_algs.iter().any(|l| l == a.label()))
            .ok_or_else(|| JoseError::NoMatchingAlgorithm {
                advertised: supported_algs.to_vec(),
            })?;
        let enc = ContentEncryption::from_label(&header.enc).ok_or_else(|| {
            JoseError::MalformedToken {
                reason: format!("unsupported content encryption '{}'", header.enc),
            }
        })?;

        let key = match header.kid.as_deref() {
            Some(kid) => snapshot.select(&KeySelector::by_kid(kid)),
            None => snapshot.select(&KeySelector::by_alg(KeyUse::Encryption, alg.label())),
        }
        .ok_or_else(|| JoseError::NoMatchingKey {
            key_use: KeyUse::Encryption.to_string(),
            alg: alg.label().to_string(),
        })?;

        let private_key = rsa_private(&key)?;
        let cek = Zeroizing::new(
            private_key
                .decrypt(oaep_padding(alg), &decode_segment(encrypted_key, "encrypted key")?)
                .map_err(|e| JoseError::DecryptionFailed {
                    reason: format!("CEK unwrap failed: {e}"),
                })?,
        );
        if cek.len() != enc.key_len() {
            return Err(JoseError::DecryptionFailed {
                reason: format!(
                    "unwrapped CEK is {} bytes, {} expects {}",
                    cek.len(),
                    enc.label(),
                    enc.key_len()
                ),
            });
        }

        let iv_bytes = decode_segment(iv, "initialization vector")?;
        let iv: [u8; GCM_IV_LEN] =
            iv_bytes
                .as_slice()
                .try_into()
                .map_err(|_| JoseError::DecryptionFailed {
                    reason: format!("initialization vector is {} bytes", iv_bytes.len()),
                })?;
        let mut sealed = decode_segment(ciphertext, "ciphertext")?;
        sealed.extend_from_slice(&decode_segment(tag, "authentication tag")?);

        let plaintext = open(enc, &cek, &iv, &sealed, protected.as_bytes())?;
        String::from_utf8(plaintext).map_err(|_| JoseError::MalformedToken {
            reason: "decrypted payload is not UTF-8".to_string(),
        })
    }
}

fn select_for(
    snapshot: &KeySetSnapshot,
    key_use: KeyUse,
    alg: &str,
) -> Result<Arc<JsonWebKey>> {
    snapshot
        .select(&KeySelector::by_alg(key_use, alg))
        .ok_or_else(|| JoseError::NoMatchingKey {
            key_use: key_use.to_string(),
            alg: alg.to_string(),
        })
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| JoseError::MalformedToken {
            reason: format!("{what}: {e}"),
        })
}

/// Base64url-decode and parse the payload segment of a compact JWS without
/// trusting it; trust is established by the later signature check.
fn parse_jws_payload(token: &str) -> Result<ClaimsMap> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(JoseError::MalformedToken {
            reason: format!("expected 3 JWS segments, got {}", parts.len()),
        });
    }
    let bytes = decode_segment(parts[1], "JWS payload")?;
    serde_json::from_slice(&bytes).map_err(|e| JoseError::MalformedToken {
        reason: format!("JWS payload: {e}"),
    })
}

/// Signing key for the `jsonwebtoken` primitives
///
/// RSA private keys are held as PKCS#1 DER; P-256 scalars are re-encoded as
/// PKCS#8 DER, the format `jsonwebtoken` expects for EC keys.
fn encoding_key(key: &JsonWebKey) -> Result<EncodingKey> {
    match &key.material {
        KeyMaterial::Rsa {
            private_der: Some(der),
            ..
        } => Ok(EncodingKey::from_rsa_der(der)),
        KeyMaterial::EcP256 {
            private: Some(scalar),
            ..
        } => {
            use p256::pkcs8::EncodePrivateKey;
            let secret =
                p256::SecretKey::from_bytes(scalar.into()).map_err(|e| JoseError::CryptoFailure {
                    reason: format!("invalid P-256 scalar: {e}"),
                })?;
            let pkcs8 = secret.to_pkcs8_der().map_err(|e| JoseError::CryptoFailure {
                reason: format!("P-256 PKCS#8 encoding failed: {e}"),
            })?;
            Ok(EncodingKey::from_ec_der(pkcs8.as_bytes()))
        }
        _ => Err(JoseError::CryptoFailure {
            reason: format!("key '{}' has no private signing material", key.kid),
        }),
    }
}

/// Verification key from the public components
fn decoding_key(key: &JsonWebKey) -> Result<DecodingKey> {
    match &key.material {
        KeyMaterial::Rsa { n, e, .. } => DecodingKey::from_rsa_components(
            &URL_SAFE_NO_PAD.encode(n),
            &URL_SAFE_NO_PAD.encode(e),
        )
        .map_err(|e| JoseError::CryptoFailure {
            reason: format!("invalid RSA public components: {e}"),
        }),
        KeyMaterial::EcP256 { x, y, .. } => DecodingKey::from_ec_components(
            &URL_SAFE_NO_PAD.encode(x),
            &URL_SAFE_NO_PAD.encode(y),
        )
        .map_err(|e| JoseError::CryptoFailure {
            reason: format!("invalid EC public components: {e}"),
        }),
    }
}

fn rsa_public(key: &JsonWebKey) -> Result<rsa::RsaPublicKey> {
    match &key.material {
        KeyMaterial::Rsa { n, e, .. } => rsa::RsaPublicKey::new(
            rsa::BigUint::from_bytes_be(n),
            rsa::BigUint::from_bytes_be(e),
        )
        .map_err(|e| JoseError::CryptoFailure {
            reason: format!("invalid RSA public key: {e}"),
        }),
        KeyMaterial::EcP256 { .. } => Err(JoseError::NoMatchingKey {
            key_use: key.key_use.to_string(),
            alg: key.alg.clone().unwrap_or_default(),
        }),
    }
}

fn rsa_private(key: &JsonWebKey) -> Result<rsa::RsaPrivateKey> {
    match &key.material {
        KeyMaterial::Rsa {
            private_der: Some(der),
            ..
        } => rsa::RsaPrivateKey::from_pkcs1_der(der).map_err(|e| JoseError::CryptoFailure {
            reason: format!("invalid RSA private key: {e}"),
        }),
        _ => Err(JoseError::NoMatchingKey {
            key_use: key.key_use.to_string(),
            alg: key.alg.clone().unwrap_or_default(),
        }),
    }
}

fn oaep_padding(alg: JweAlgorithm) -> Oaep {
    match alg {
        JweAlgorithm::RsaOaep => Oaep::new::<sha1::Sha1>(),
        JweAlgorithm::RsaOaep256 => Oaep::new::<sha2::Sha256>(),
    }
}

fn seal(
    enc: ContentEncryption,
    cek: &[u8],
    iv: &[u8; GCM_IV_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let nonce = Nonce::from(*iv);
    let payload = Payload {
        msg: plaintext,
        aad,
    };
    let sealed = match enc {
        ContentEncryption::A128Gcm => Aes128Gcm::new_from_slice(cek)
            .map_err(invalid_cek)?
            .encrypt(&nonce, payload),
        ContentEncryption::A256Gcm => Aes256Gcm::new_from_slice(cek)
            .map_err(invalid_cek)?
            .encrypt(&nonce, payload),
    };
    sealed.map_err(|_| JoseError::CryptoFailure {
        reason: "AEAD encryption failed".to_string(),
    })
}

fn open(
    enc: ContentEncryption,
    cek: &[u8],
    iv: &[u8; GCM_IV_LEN],
    sealed: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let nonce = Nonce::from(*iv);
    let payload = Payload { msg: sealed, aad };
    let opened = match enc {
        ContentEncryption::A128Gcm => Aes128Gcm::new_from_slice(cek)
            .map_err(invalid_cek)?
            .decrypt(&nonce, payload),
        ContentEncryption::A256Gcm => Aes256Gcm::new_from_slice(cek)
            .map_err(invalid_cek)?
            .decrypt(&nonce, payload),
    };
    opened.map_err(|_| JoseError::DecryptionFailed {
        reason: "AEAD authentication failed".to_string(),
    })
}

fn invalid_cek(e: aes_gcm::aes::cipher::InvalidLength) -> JoseError {
    JoseError::DecryptionFailed {
        reason: format!("content-encryption key length: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::*;
    use crate::key::KeyStore;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn claims() -> ClaimsMap {
        json!({
            "iss": "https://idp.example",
            "sub": "user-1",
            "aud": "client1",
            "exp": now() + 600,
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn validator() -> ClaimsValidator {
        ClaimsValidator::new("https://idp.example", "client1")
            .with_clock_tolerance(Duration::from_secs(5))
    }

    fn signing_codec() -> TokenCodec {
        let store = KeyStore::new(vec![
            JsonWebKey::generate_p256("ec-1").unwrap(),
            JsonWebKey::generate_rsa("rsa-1", KeyUse::Signature, "RS256").unwrap(),
        ])
        .unwrap();
        TokenCodec::new(Arc::new(store))
    }

    #[test]
    fn sign_verify_round_trip_es256() {
        let codec = signing_codec();
        let token = codec.sign(&claims(), &labels(&["ES256", "RS256"])).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let verified = codec
            .verify(&token, &labels(&["ES256"]), &validator(), &["sub"])
            .unwrap();
        assert_eq!(verified["sub"], "user-1");
    }

    #[test]
    fn sign_verify_round_trip_rs256() {
        let codec = signing_codec();
        let token = codec.sign(&claims(), &labels(&["RS256"])).unwrap();
        let verified = codec
            .verify(&token, &labels(&["RS256"]), &validator(), &[])
            .unwrap();
        assert_eq!(verified["iss"], "https://idp.example");
    }

    #[test]
    fn verify_rejects_algorithm_outside_allow_list() {
        let codec = signing_codec();
        // Cryptographically valid ES256 token, but the caller only accepts
        // RS256: must fail before any key or signature work happens.
        let token = codec.sign(&claims(), &labels(&["ES256"])).unwrap();
        let err = codec
            .verify(&token, &labels(&["RS256"]), &validator(), &[])
            .unwrap_err();
        assert!(matches!(err, JoseError::NoMatchingAlgorithm { .. }));
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let codec = signing_codec();
        let token = codec.sign(&claims(), &labels(&["ES256"])).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut sig = URL_SAFE_NO_PAD.decode(&parts[2]).unwrap();
        sig[0] ^= 0x01;
        parts[2] = URL_SAFE_NO_PAD.encode(sig);
        let tampered = parts.join(".");

        let err = codec
            .verify(&tampered, &labels(&["ES256"]), &validator(), &[])
            .unwrap_err();
        assert!(matches!(err, JoseError::SignatureVerificationFailed));
    }

    #[test]
    fn kid_free_token_resolves_by_alg_and_use() {
        let codec = signing_codec();
        let snapshot = codec.key_store().snapshot();
        let key = snapshot
            .select(&KeySelector::by_alg(KeyUse::Signature, "ES256"))
            .unwrap();

        // Token signed by a party that does not set kid
        let header = Header::new(jsonwebtoken::Algorithm::ES256);
        let token =
            jsonwebtoken::encode(&header, &claims(), &encoding_key(&key).unwrap()).unwrap();

        let verified = codec
            .verify(&token, &labels(&["ES256"]), &validator(), &[])
            .unwrap();
        assert_eq!(verified["sub"], "user-1");
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let store = KeyStore::new(vec![JsonWebKey::generate_rsa(
            "enc-1",
            KeyUse::Encryption,
            "RSA-OAEP-256",
        )
        .unwrap()])
        .unwrap();
        let codec = TokenCodec::new(Arc::new(store));

        let jwe = codec
            .encrypt(
                b"nested payload",
                &labels(&["RSA-OAEP-256"]),
                &labels(&["A256GCM"]),
                Some("JWT"),
            )
            .unwrap();
        assert_eq!(jwe.split('.').count(), 5);

        let plaintext = codec.decrypt(&jwe, &labels(&["RSA-OAEP-256"])).unwrap();
        assert_eq!(plaintext, "nested payload");
    }

    #[test]
    fn encrypt_requires_a_content_encryption_method() {
        let store = KeyStore::new(vec![JsonWebKey::generate_rsa(
            "enc-1",
            KeyUse::Encryption,
            "RSA-OAEP",
        )
        .unwrap()])
        .unwrap();
        let codec = TokenCodec::new(Arc::new(store));

        let err = codec
            .encrypt(b"x", &labels(&["RSA-OAEP"]), &[], None)
            .unwrap_err();
        assert!(matches!(err, JoseError::InvalidConfiguration { .. }));
    }

    #[test]
    fn decrypt_rejects_algorithm_outside_allow_list() {
        let store = KeyStore::new(vec![JsonWebKey::generate_rsa(
            "enc-1",
            KeyUse::Encryption,
            "RSA-OAEP",
        )
        .unwrap()])
        .unwrap();
        let codec = TokenCodec::new(Arc::new(store));

        let jwe = codec
            .encrypt(b"x", &labels(&["RSA-OAEP"]), &labels(&["A128GCM"]), None)
            .unwrap();
        let err = codec.decrypt(&jwe, &labels(&["RSA-OAEP-256"])).unwrap_err();
        assert!(matches!(err, JoseError::NoMatchingAlgorithm { .. }));
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let store = KeyStore::new(vec![JsonWebKey::generate_rsa(
            "enc-1",
            KeyUse::Encryption,
            "RSA-OAEP-256",
        )
        .unwrap()])
        .unwrap();
        let codec = TokenCodec::new(Arc::new(store));

        let jwe = codec
            .encrypt(b"secret", &labels(&["RSA-OAEP-256"]), &labels(&["A256GCM"]), None)
            .unwrap();
        let mut parts: Vec<String> = jwe.split('.').map(str::to_string).collect();
        let mut ct = URL_SAFE_NO_PAD.decode(&parts[3]).unwrap();
        ct[0] ^= 0x01;
        parts[3] = URL_SAFE_NO_PAD.encode(ct);

        let err = codec
            .decrypt(&parts.join("."), &labels(&["RSA-OAEP-256"]))
            .unwrap_err();
        assert!(matches!(err, JoseError::DecryptionFailed { .. }));
    }

    #[test]
    fn garbage_tokens_are_malformed_not_crashes() {
        let codec = signing_codec();
        for garbage in ["", "a.b", "a.b.c.d", "!!.!!.!!"] {
            let err = codec
                .verify(garbage, &labels(&["ES256"]), &validator(), &[])
                .unwrap_err();
            assert!(
                matches!(err, JoseError::MalformedToken { .. }),
                "{garbage:?} -> {err:?}"
            );
        }
        let err = codec.decrypt("a.b.c", &labels(&["RSA-OAEP"])).unwrap_err();
        assert!(matches!(err, JoseError::MalformedToken { .. }));
    }
}
