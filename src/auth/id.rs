//! Strongly typed identifiers enforced across the session domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $repr:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = $repr, into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}

			/// Returns the identifier as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (tenant, service).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (tenant, service).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (tenant, service).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier was neither a string nor an integer.
	#[error("{kind} identifier must be a string or an integer.")]
	UnsupportedRepresentation {
		/// Kind of identifier (tenant, service).
		kind: &'static str,
	},
}

/// Wire representation of identifiers the backend may send as JSON numbers or strings.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
	/// String-encoded identifier.
	Text(String),
	/// Number-encoded identifier.
	Number(serde_json::Number),
}
impl RawId {
	/// Normalizes the identifier to its string form.
	pub fn into_string(self) -> Result<String, IdentifierError> {
		match self {
			Self::Text(text) => Ok(text),
			Self::Number(number) if number.is_i64() || number.is_u64() => Ok(number.to_string()),
			Self::Number(_) => Err(IdentifierError::UnsupportedRepresentation { kind: "Tenant" }),
		}
	}
}
impl TryFrom<RawId> for TenantId {
	type Error = IdentifierError;

	fn try_from(value: RawId) -> Result<Self, Self::Error> {
		Self::try_from(value.into_string()?)
	}
}

def_id! { TenantId, "Tenant (church) identifier, numeric ids kept as text.", "Tenant", "RawId" }
def_id! { ServiceName, "Backend service that issues its own grants.", "Service", "String" }

impl TenantId {
	/// Compares against an identifier supplied in any textual form.
	pub fn matches(&self, candidate: &str) -> bool {
		self.0 == candidate.trim()
	}
}

impl ServiceName {
	/// Key name of the membership/identity service.
	pub const MEMBERSHIP: &'static str = "MembershipApi";
	/// Key name of the attendance service.
	pub const ATTENDANCE: &'static str = "AttendanceApi";

	/// Membership/identity service, used for login and tenant appearance.
	pub fn membership() -> Self {
		Self(Self::MEMBERSHIP.to_owned())
	}

	/// Attendance service, used by check-in screens.
	pub fn attendance() -> Self {
		Self(Self::ATTENDANCE.to_owned())
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_padding_and_blanks() {
		assert!(TenantId::new(" 42").is_err(), "Leading whitespace must be rejected.");
		assert!(ServiceName::new("").is_err());
		assert!(ServiceName::new("Membership Api").is_err());

		let tenant = TenantId::new("42").expect("Tenant fixture should be considered valid.");

		assert_eq!(tenant.as_ref(), "42");
		assert!(tenant.matches("42"));
		assert!(tenant.matches(" 42 "));
		assert!(!tenant.matches("420"));
	}

	#[test]
	fn tenant_ids_accept_numbers_and_strings() {
		let numeric: TenantId =
			serde_json::from_str("42").expect("Numeric tenant id should deserialize.");
		let textual: TenantId =
			serde_json::from_str("\"42\"").expect("String tenant id should deserialize.");

		assert_eq!(numeric, textual);
		assert_eq!(serde_json::to_string(&numeric).expect("Tenant id should serialize."), "\"42\"");
		assert!(serde_json::from_str::<TenantId>("4.2").is_err());
		assert!(serde_json::from_str::<TenantId>("\"\"").is_err());
	}

	#[test]
	fn service_names_round_trip_as_strings() {
		let service: ServiceName =
			serde_json::from_str("\"AttendanceApi\"").expect("Service name should deserialize.");

		assert_eq!(service, ServiceName::attendance());
		assert!(serde_json::from_str::<ServiceName>("7").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<ServiceName, u8> = HashMap::from_iter([(ServiceName::membership(), 7_u8)]);

		assert_eq!(map.get("MembershipApi"), Some(&7));
	}
}
