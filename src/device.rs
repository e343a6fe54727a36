//! Cached device configuration restored alongside the session.

// self
use crate::_prelude::*;

/// Label printer the kiosk prints name tags on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfig {
	/// Network address of the printer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ip_address: Option<String>,
	/// Printer model identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	/// Fields this crate does not interpret, preserved verbatim.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unknown_printer_fields_survive() {
		let raw = r#"{"ipAddress":"10.0.0.9","model":"QL-820NWB","dpi":300}"#;
		let printer: PrinterConfig = serde_json::from_str(raw).expect("Printer should decode.");

		assert_eq!(printer.ip_address.as_deref(), Some("10.0.0.9"));
		assert_eq!(printer.extra.get("dpi"), Some(&Value::from(300)));
		assert_eq!(
			serde_json::to_value(&printer).expect("Printer should encode."),
			serde_json::from_str::<Value>(raw).expect("Fixture should parse.")
		);
	}
}
