//! Ordered, de-duplicated permission sets attached to service grants.

// crates.io
use serde::de::IgnoredAny;
// self
use crate::_prelude::*;

/// Permission entry as the backend may send it: a plain string or a structured pair.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum WirePermission {
	Plain(String),
	#[serde(rename_all = "camelCase")]
	Structured {
		content_type: String,
		action: String,
	},
	Other(IgnoredAny),
}
impl WirePermission {
	fn normalize(self) -> Option<String> {
		let permission = match self {
			Self::Plain(permission) => permission.trim().to_owned(),
			Self::Structured { content_type, action } =>
				format!("{}.{}", content_type.trim(), action.trim()),
			Self::Other(_) => return None,
		};

		if permission.is_empty() { None } else { Some(permission) }
	}
}

/// Permissions granted for one service, in server order with duplicates removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<String>);
impl PermissionSet {
	/// Builds a set from any iterator of permission strings, dropping blanks and repeats.
	pub fn new<I, S>(permissions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut set = Self::default();

		for permission in permissions {
			set.push(permission.into());
		}

		set
	}

	/// Returns `true` when the permission string is part of the set.
	pub fn contains(&self, permission: &str) -> bool {
		self.0.iter().any(|held| held == permission)
	}

	/// Iterates over permissions in server order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Number of distinct permissions.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no permission is held.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn push(&mut self, permission: String) {
		let permission = permission.trim();

		if !permission.is_empty() && !self.contains(permission) {
			self.0.push(permission.to_owned());
		}
	}
}
impl<'de> Deserialize<'de> for PermissionSet {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let entries = Option::<Vec<WirePermission>>::deserialize(deserializer)?.unwrap_or_default();

		Ok(Self::new(entries.into_iter().filter_map(WirePermission::normalize)))
	}
}
