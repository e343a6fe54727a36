//! Redacting wrappers for bearer tokens and stored passwords.

// self
use crate::_prelude::*;

macro_rules! def_secret {
	($name:ident, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);
		impl $name {
			/// Wraps a new secret string.
			pub fn new(value: impl Into<String>) -> Self {
				Self(value.into())
			}

			/// Returns the inner value. Callers must avoid logging this string.
			pub fn expose(&self) -> &str {
				&self.0
			}

			/// Returns `true` when the secret carries no characters.
			pub fn is_empty(&self) -> bool {
				self.0.is_empty()
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				self.expose()
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&"<redacted>").finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str("<redacted>")
			}
		}
	};
}

def_secret! { TokenSecret, "Bearer token (usually a JWT) kept out of logs." }
def_secret! { Password, "Stored credential password kept out of logs." }

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let token = TokenSecret::new("header.payload.signature");
		let password = Password::new("hunter2");

		assert_eq!(format!("{token:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{password:?}"), "Password(\"<redacted>\")");
		assert_eq!(format!("{password}"), "<redacted>");
		assert_eq!(password.expose(), "hunter2");
	}

	#[test]
	fn secrets_serialize_as_plain_strings() {
		let token = TokenSecret::new("abc");

		assert_eq!(serde_json::to_string(&token).expect("Token should serialize."), "\"abc\"");
		assert!(TokenSecret::new("").is_empty());
	}
}
