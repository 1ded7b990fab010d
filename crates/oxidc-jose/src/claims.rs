//! Ordered validation of standard JWT claims
//!
//! Checks run in a fixed order and the first violation wins; there is no
//! partial aggregation. Validation never mutates the payload except for the
//! documented `address` normalization.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::error::JoseError;
use crate::{Result, DEFAULT_CLOCK_TOLERANCE_SECONDS};

/// A token payload: claim name to value, extension claims pass through opaquely
pub type ClaimsMap = serde_json::Map<String, Value>;

/// Validator for the reserved claims `iss`, `iat`, `nbf`, `exp`, `aud`
///
/// Evaluation order (first violation wins):
/// 1. every required field present
/// 2. `iss` equals the expected issuer exactly
/// 3. `iat`, if present, is at most `now + tolerance`
/// 4. `nbf`, if present, is at most `now + tolerance`
/// 5. `exp`, if present, is strictly after `now` (no skew grace on expiry)
/// 6. `aud`, if present (string or string array), contains the expected
///    audience
#[derive(Debug, Clone)]
pub struct ClaimsValidator {
    expected_issuer: String,
    expected_audience: String,
    clock_tolerance: Duration,
}

impl ClaimsValidator {
    /// Create a validator with the default clock tolerance
    pub fn new(expected_issuer: impl Into<String>, expected_audience: impl Into<String>) -> Self {
        Self {
            expected_issuer: expected_issuer.into(),
            expected_audience: expected_audience.into(),
            clock_tolerance: Duration::from_secs(DEFAULT_CLOCK_TOLERANCE_SECONDS),
        }
    }

    /// Override the clock skew tolerance
    pub fn with_clock_tolerance(mut self, tolerance: Duration) -> Self {
        self.clock_tolerance = tolerance;
        self
    }

    /// The issuer this validator expects
    pub fn expected_issuer(&self) -> &str {
        &self.expected_issuer
    }

    /// The audience this validator expects
    pub fn expected_audience(&self) -> &str {
        &self.expected_audience
    }

    /// Validate a payload, returning it unchanged on success
    ///
    /// The single documented exception: a string-valued `address` claim that
    /// parses as JSON is replaced by its structured form; a parse failure
    /// leaves the string untouched and is not an error.
    ///
    /// # Errors
    /// The first violated check, as a distinct [`JoseError`] variant.
    pub fn validate(&self, mut payload: ClaimsMap, required: &[&str]) -> Result<ClaimsMap> {
        for claim in required {
            if !payload.contains_key(*claim) {
                return Err(JoseError::MissingRequiredClaim {
                    claim: (*claim).to_string(),
                });
            }
        }

        let found = payload
            .get("iss")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if found != self.expected_issuer {
            return Err(JoseError::InvalidIssuer {
                expected: self.expected_issuer.clone(),
                found: found.to_string(),
            });
        }

        let now = now_unix()?;
        let tolerance = self.clock_tolerance.as_secs();

        if let Some(value) = payload.get("iat") {
            let iat = numeric_timestamp("iat", value)?;
            if iat > now + tolerance as i64 {
                return Err(JoseError::TokenIssuedInFuture {
                    iat,
                    now,
                    tolerance_secs: tolerance,
                });
            }
        }

        if let Some(value) = payload.get("nbf") {
            let nbf = numeric_timestamp("nbf", value)?;
            if nbf > now + tolerance as i64 {
                return Err(JoseError::TokenNotYetValid {
                    nbf,
                    now,
                    tolerance_secs: tolerance,
                });
            }
        }

        if let Some(value) = payload.get("exp") {
            let exp = numeric_timestamp("exp", value)?;
            // Expiry is strict: skew tolerance widens the acceptance window
            // for iat/nbf but never extends a token's lifetime.
            if now >= exp {
                return Err(JoseError::TokenExpired {
                    exp,
                    now,
                    tolerance_secs: tolerance,
                });
            }
        }

        if let Some(aud) = payload.get("aud") {
            if !audience_contains(aud, &self.expected_audience) {
                return Err(JoseError::InvalidAudience {
                    expected: self.expected_audience.clone(),
                });
            }
        }

        normalize_address(&mut payload);
        Ok(payload)
    }
}

/// Seconds since the Unix epoch
fn now_unix() -> Result<i64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .map_err(|_| JoseError::CryptoFailure {
            reason: "system clock before Unix epoch".to_string(),
        })
}

fn numeric_timestamp(claim: &str, value: &Value) -> Result<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .ok_or_else(|| JoseError::MalformedToken {
            reason: format!("claim '{claim}' is not a numeric timestamp"),
        })
}

/// `aud` may be a single string or an array of strings
fn audience_contains(aud: &Value, expected: &str) -> bool {
    match aud {
        Value::String(s) => s == expected,
        Value::Array(entries) => entries
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s == expected),
        _ => false,
    }
}

/// Some IdPs serialize the `address` claim as a JSON string; replace it with
/// the structured form when it parses, leave it alone when it does not.
fn normalize_address(payload: &mut ClaimsMap) {
    let parsed = match payload.get("address") {
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).ok(),
        _ => None,
    };
    if let Some(structured) = parsed {
        payload.insert("address".to_string(), structured);
    }
}
