//! End-to-end token pipeline tests: nested JWE(JWS) round trips, processing
//! order on hostile input, and key rollover behavior.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::json;

use oxidc_jose::{
    ClaimsMap, ClaimsValidator, JoseError, JsonWebKey, KeyStore, KeyUse, TokenCodec,
};

fn labels(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn id_token_claims() -> ClaimsMap {
    json!({
        "iss": "https://idp.example",
        "sub": "user-1",
        "aud": "client1",
        "iat": now(),
        "exp": now() + 600,
        "nonce": "n-0S6_WzA2Mj",
    })
    .as_object()
    .unwrap()
    .clone()
}

fn validator() -> ClaimsValidator {
    ClaimsValidator::new("https://idp.example", "client1")
        .with_clock_tolerance(Duration::from_secs(5))
}

fn codec() -> TokenCodec {
    let store = KeyStore::new(vec![
        JsonWebKey::generate_p256("sig-1").unwrap(),
        JsonWebKey::generate_rsa("enc-1", KeyUse::Encryption, "RSA-OAEP-256").unwrap(),
    ])
    .unwrap();
    TokenCodec::new(Arc::new(store))
}

#[test]
fn nested_jwe_over_jws_round_trips() {
    let codec = codec();

    let jws = codec.sign(&id_token_claims(), &labels(&["ES256"])).unwrap();
    let jwe = codec
        .encrypt(
            jws.as_bytes(),
            &labels(&["RSA-OAEP-256"]),
            &labels(&["A256GCM"]),
            Some("JWT"),
        )
        .unwrap();
    assert_eq!(jwe.split('.').count(), 5);

    let inner = codec.decrypt(&jwe, &labels(&["RSA-OAEP-256"])).unwrap();
    assert_eq!(inner, jws);

    let claims = codec
        .verify(&inner, &labels(&["ES256"]), &validator(), &["iss", "sub", "aud"])
        .unwrap();
    assert_eq!(claims["nonce"], "n-0S6_WzA2Mj");
}

#[test]
fn signature_check_precedes_claims_validation() {
    let codec = codec();
    // Expired claims in a token whose payload segment is then tampered:
    // the broken signature must be reported, never the expiry.
    let mut claims = id_token_claims();
    claims.insert("exp".into(), json!(now() - 1000));
    let token = codec.sign(&claims, &labels(&["ES256"])).unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    parts[1] = parts[1].replace(|c: char| c == 'a', "b");
    let err = codec
        .verify(&parts.join("."), &labels(&["ES256"]), &validator(), &[])
        .unwrap_err();
    assert!(
        matches!(
            err,
            JoseError::SignatureVerificationFailed | JoseError::MalformedToken { .. }
        ),
        "got {err:?}"
    );
}

#[test]
fn expired_token_with_valid_signature_reports_expiry() {
    let codec = codec();
    let mut claims = id_token_claims();
    claims.insert("exp".into(), json!(now() - 1000));
    let token = codec.sign(&claims, &labels(&["ES256"])).unwrap();

    let err = codec
        .verify(&token, &labels(&["ES256"]), &validator(), &[])
        .unwrap_err();
    assert!(matches!(err, JoseError::TokenExpired { .. }));
}

#[test]
fn rollover_does_not_disturb_a_pinned_pipeline() {
    let codec = codec();
    let token = codec.sign(&id_token_claims(), &labels(&["ES256"])).unwrap();

    // A pipeline captures its key-set version up front.
    let pinned = codec.key_store().snapshot();

    // Rollover lands before the pipeline gets to verification.
    codec
        .key_store()
        .replace(vec![JsonWebKey::generate_p256("sig-2").unwrap()])
        .unwrap();

    // The pinned pipeline still verifies against the old keys.
    let claims = codec
        .verify_pinned(&pinned, &token, &labels(&["ES256"]), &validator(), &["sub"])
        .unwrap();
    assert_eq!(claims["sub"], "user-1");

    // A fresh verification resolves the old kid against the new set and
    // must fail key resolution.
    let err = codec
        .verify(&token, &labels(&["ES256"]), &validator(), &[])
        .unwrap_err();
    assert!(matches!(err, JoseError::NoMatchingKey { .. }));
}

#[test]
fn published_jwk_set_round_trips_as_json() {
    let codec = codec();
    let exported = codec.key_store().export_public();

    let json = serde_json::to_string(&exported).unwrap();
    assert!(json.contains("\"kty\":\"EC\""));
    assert!(json.contains("\"kty\":\"RSA\""));

    let parsed: oxidc_jose::PublicJwkSet = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, exported);
}
