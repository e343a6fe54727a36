//! Unverified JWT payload decoding for display and expiry checks.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, auth::TokenSecret, error::DecodeError};

/// Claims decoded from a bearer token's payload segment.
///
/// The signature is not verified; the backend remains the authority on token validity.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenClaims {
	/// Expiry instant when the token carries a numeric `exp` claim.
	pub expires_at: Option<OffsetDateTime>,
	/// Full payload as JSON.
	pub payload: Value,
}
impl TokenClaims {
	/// Decodes the payload segment of a three-part JWT.
	pub fn decode(token: &TokenSecret) -> Result<Self, DecodeError> {
		let mut segments = token.expose().split('.');
		let (Some(_header), Some(payload), Some(_signature), None) =
			(segments.next(), segments.next(), segments.next(), segments.next())
		else {
			return Err(DecodeError::TokenShape);
		};
		let bytes = URL_SAFE_NO_PAD
			.decode(payload.trim_end_matches('='))
			.map_err(|source| DecodeError::TokenEncoding { source })?;
		let payload = serde_json::from_slice::<Value>(&bytes)
			.map_err(|source| DecodeError::Syntax { what: "token payload", source })?;
		let expires_at = payload
			.get("exp")
			.and_then(Value::as_i64)
			.and_then(|exp| OffsetDateTime::from_unix_timestamp(exp).ok());

		Ok(Self { expires_at, payload })
	}

	/// Returns `true` when the token carries an expiry at or before `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|exp| exp <= now)
	}

	/// Looks up a string claim by name.
	pub fn str_claim(&self, name: &str) -> Option<&str> {
		self.payload.get(name).and_then(Value::as_str)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn jwt(payload: Value) -> TokenSecret {
		let body = URL_SAFE_NO_PAD.encode(payload.to_string());

		TokenSecret::new(format!("eyJhbGciOiJub25lIn0.{body}.sig"))
	}

	#[test]
	fn decodes_expiry_and_string_claims() {
		let claims = TokenClaims::decode(&jwt(json!({ "exp": 1_700_000_000, "churchId": "42" })))
			.expect("Claims should decode.");

		assert_eq!(claims.expires_at.map(OffsetDateTime::unix_timestamp), Some(1_700_000_000));
		assert_eq!(claims.str_claim("churchId"), Some("42"));
		assert!(claims.is_expired_at(OffsetDateTime::now_utc()));
	}

	#[test]
	fn rejects_opaque_tokens() {
		assert!(matches!(
			TokenClaims::decode(&TokenSecret::new("opaque")),
			Err(DecodeError::TokenShape)
		));
		assert!(matches!(
			TokenClaims::decode(&TokenSecret::new("a.!!!.c")),
			Err(DecodeError::TokenEncoding { .. })
		));
	}

	#[test]
	fn missing_expiry_never_expires() {
		let claims =
			TokenClaims::decode(&jwt(json!({ "sub": "usher" }))).expect("Claims should decode.");

		assert!(claims.expires_at.is_none());
		assert!(!claims.is_expired_at(OffsetDateTime::now_utc()));
	}
}
