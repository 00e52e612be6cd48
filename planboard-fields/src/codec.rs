//! Typed value codec: raw control input ⇄ stored [`PropertyValue`].
//!
//! The codec is the single translation boundary between untyped form input
//! and typed storage. In [`CodecMode::Lenient`] (the default) malformed
//! numbers and dates degrade to "unset" and dropdown/url values are trusted.
//! [`CodecMode::Strict`] rejects the same input with
//! [`FieldsError::InvalidValue`] instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FieldsError, Result};
use crate::types::{PropertyDef, PropertyType, PropertyValue, RawValue};

/// Placeholder shown for unset values.
pub const UNSET_DISPLAY: &str = "—";

/// How the codec treats malformed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecMode {
    /// Malformed input becomes "unset"; dropdown and url values are trusted.
    #[default]
    Lenient,
    /// Malformed or out-of-list input is an error.
    Strict,
}

/// Converts raw input into the canonical stored form for a definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec {
    mode: CodecMode,
}

impl ValueCodec {
    pub fn new(mode: CodecMode) -> Self {
        Self { mode }
    }

    pub fn lenient() -> Self {
        Self::new(CodecMode::Lenient)
    }

    pub fn strict() -> Self {
        Self::new(CodecMode::Strict)
    }

    pub fn mode(&self) -> CodecMode {
        self.mode
    }

    /// Decode raw input for a property that has no current value.
    ///
    /// `Ok(None)` means "unset": the caller removes the stored key.
    pub fn decode(&self, def: &PropertyDef, raw: &RawValue) -> Result<Option<PropertyValue>> {
        self.decode_with_current(def, raw, None)
    }

    /// Decode raw input, taking the currently stored value into account.
    ///
    /// Only `tags` looks at the current value: with a non-empty option list,
    /// values already present on the task stay selectable.
    pub fn decode_with_current(
        &self,
        def: &PropertyDef,
        raw: &RawValue,
        current: Option<&PropertyValue>,
    ) -> Result<Option<PropertyValue>> {
        match def.type_ {
            PropertyType::Text => Ok(as_text(raw).map(PropertyValue::Text)),
            PropertyType::Url => self.decode_url(def, raw),
            PropertyType::Number => self.decode_number(def, raw),
            PropertyType::Date => self.decode_date(def, raw),
            PropertyType::Boolean => self.decode_bool(def, raw),
            PropertyType::Dropdown => self.decode_dropdown(def, raw),
            PropertyType::Tags => self.decode_tags(def, raw, current),
        }
    }

    /// Encode a stored value back into the raw form a control displays.
    pub fn encode(&self, def: &PropertyDef, value: &PropertyValue) -> RawValue {
        if value.property_type() != def.type_ {
            warn!(
                property = %def.name,
                declared = %def.type_,
                stored = %value.property_type(),
                "encoding value stored under a different type"
            );
        }
        match value {
            PropertyValue::Text(s) | PropertyValue::Dropdown(s) | PropertyValue::Url(s) => {
                RawValue::Text(s.clone())
            }
            PropertyValue::Number(n) => RawValue::Number(*n),
            PropertyValue::Date(d) => RawValue::Date(d.fixed_offset()),
            PropertyValue::Bool(b) => RawValue::Bool(*b),
            PropertyValue::Tags(tags) => RawValue::List(tags.clone()),
        }
    }

    fn reject(
        &self,
        def: &PropertyDef,
        message: impl Into<String>,
    ) -> Result<Option<PropertyValue>> {
        let message = message.into();
        match self.mode {
            CodecMode::Lenient => {
                debug!(property = %def.name, %message, "input degraded to unset");
                Ok(None)
            }
            CodecMode::Strict => Err(FieldsError::invalid_value(&def.name, message)),
        }
    }

    fn decode_url(&self, def: &PropertyDef, raw: &RawValue) -> Result<Option<PropertyValue>> {
        let Some(text) = as_text(raw) else {
            return Ok(None);
        };
        if self.mode == CodecMode::Strict && !has_http_scheme(&text) {
            return Err(FieldsError::invalid_value(
                &def.name,
                format!("'{text}' is not an http(s) URL"),
            ));
        }
        Ok(Some(PropertyValue::Url(text)))
    }

    fn decode_number(&self, def: &PropertyDef, raw: &RawValue) -> Result<Option<PropertyValue>> {
        let parsed = match raw {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                match s.parse::<f64>() {
                    Ok(n) => n,
                    Err(_) => return self.reject(def, format!("'{s}' is not a number")),
                }
            }
            other => return self.reject(def, format!("expected a number, got {other:?}")),
        };
        if !parsed.is_finite() {
            return self.reject(def, "number must be finite");
        }
        Ok(Some(PropertyValue::Number(parsed)))
    }

    fn decode_date(&self, def: &PropertyDef, raw: &RawValue) -> Result<Option<PropertyValue>> {
        match raw {
            RawValue::Date(d) => Ok(Some(PropertyValue::Date(normalize_instant(
                d.with_timezone(&Utc),
            )))),
            RawValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                match parse_date_input(s) {
                    Some(d) => Ok(Some(PropertyValue::Date(d))),
                    None => self.reject(def, format!("'{s}' is not a date")),
                }
            }
            other => self.reject(def, format!("expected a date, got {other:?}")),
        }
    }

    fn decode_bool(&self, def: &PropertyDef, raw: &RawValue) -> Result<Option<PropertyValue>> {
        let value = match raw {
            RawValue::Bool(b) => *b,
            RawValue::Number(n) => *n != 0.0,
            RawValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => true,
                "false" | "no" | "off" | "0" | "" => false,
                other => {
                    if self.mode == CodecMode::Strict {
                        return Err(FieldsError::invalid_value(
                            &def.name,
                            format!("'{other}' is not a boolean"),
                        ));
                    }
                    false
                }
            },
            other => {
                if self.mode == CodecMode::Strict {
                    return Err(FieldsError::invalid_value(
                        &def.name,
                        format!("expected a boolean, got {other:?}"),
                    ));
                }
                false
            }
        };
        // A touched boolean is never unset.
        Ok(Some(PropertyValue::Bool(value)))
    }

    fn decode_dropdown(&self, def: &PropertyDef, raw: &RawValue) -> Result<Option<PropertyValue>> {
        let Some(choice) = as_text(raw) else {
            return Ok(None);
        };
        if self.mode == CodecMode::Strict && !def.has_option(&choice) {
            return Err(FieldsError::invalid_value(
                &def.name,
                format!("'{choice}' is not one of the options"),
            ));
        }
        Ok(Some(PropertyValue::Dropdown(choice)))
    }

    fn decode_tags(
        &self,
        def: &PropertyDef,
        raw: &RawValue,
        current: Option<&PropertyValue>,
    ) -> Result<Option<PropertyValue>> {
        let items: Vec<String> = match raw {
            RawValue::List(items) => items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            RawValue::Text(s) => s
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            other => return self.reject(def, format!("expected tags, got {other:?}")),
        };

        let tags = if def.options.is_empty() {
            items
        } else {
            let existing: &[String] = match current {
                Some(PropertyValue::Tags(tags)) => tags,
                _ => &[],
            };
            let mut accepted: Vec<String> = Vec::with_capacity(items.len());
            for tag in items {
                let allowed = def.has_option(&tag) || existing.contains(&tag);
                if !allowed {
                    if self.mode == CodecMode::Strict {
                        return Err(FieldsError::invalid_value(
                            &def.name,
                            format!("'{tag}' is not an allowed tag"),
                        ));
                    }
                    debug!(property = %def.name, %tag, "dropping tag outside the allowed set");
                    continue;
                }
                if !accepted.contains(&tag) {
                    accepted.push(tag);
                }
            }
            accepted
        };

        if tags.is_empty() {
            return Ok(None);
        }
        Ok(Some(PropertyValue::Tags(tags)))
    }
}

/// Render a stored value for display. Unset renders as "—".
pub fn display_value(value: Option<&PropertyValue>) -> String {
    match value {
        None => UNSET_DISPLAY.to_string(),
        Some(PropertyValue::Text(s))
        | Some(PropertyValue::Dropdown(s))
        | Some(PropertyValue::Url(s)) => s.clone(),
        Some(PropertyValue::Number(n)) => n.to_string(),
        Some(PropertyValue::Date(d)) => d.format("%Y-%m-%d %H:%M UTC").to_string(),
        Some(PropertyValue::Bool(true)) => "Yes".to_string(),
        Some(PropertyValue::Bool(false)) => "No".to_string(),
        Some(PropertyValue::Tags(tags)) if tags.is_empty() => UNSET_DISPLAY.to_string(),
        Some(PropertyValue::Tags(tags)) => tags.join(", "),
    }
}

/// Truncate an instant to millisecond precision, the precision dates are stored at.
pub fn normalize_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(3)
}

/// Parse date picker / text input into a UTC instant.
///
/// Accepts RFC 3339 with any offset, naive `YYYY-MM-DDTHH:MM[:SS]` (taken as
/// UTC) and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_date_input(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(normalize_instant(dt.with_timezone(&Utc)));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(normalize_instant(naive.and_utc()));
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn as_text(raw: &RawValue) -> Option<String> {
    let text = match raw {
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::Number(n) => n.to_string(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Date(d) => d.to_rfc3339(),
        RawValue::List(items) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn has_http_scheme(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PropertyId, Scope};
    use chrono::TimeZone;

    fn def(type_: PropertyType) -> PropertyDef {
        PropertyDef {
            id: PropertyId::new(),
            scope: Scope::project("apollo"),
            name: format!("{type_} prop"),
            type_,
            options: Vec::new(),
            required: false,
            display_order: 0,
        }
    }

    fn with_options(mut def: PropertyDef, options: &[&str]) -> PropertyDef {
        def.options = options.iter().map(|s| s.to_string()).collect();
        def
    }

    #[test]
    fn deserialized_timestamp_text_is_kept_verbatim() {
        let raw: RawValue = serde_json::from_str("\"2024-01-01T00:00:00Z\"").unwrap();
        let codec = ValueCodec::lenient();
        assert_eq!(
            codec.decode(&def(PropertyType::Text), &raw).unwrap(),
            Some(PropertyValue::Text("2024-01-01T00:00:00Z".into()))
        );

        let stage = with_options(def(PropertyType::Dropdown), &["2024-01-01T00:00:00Z"]);
        assert_eq!(
            ValueCodec::strict().decode(&stage, &raw).unwrap(),
            Some(PropertyValue::Dropdown("2024-01-01T00:00:00Z".into()))
        );

        let due = codec.decode(&def(PropertyType::Date), &raw).unwrap();
        assert_eq!(
            due,
            Some(PropertyValue::Date(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn text_is_trimmed_and_empty_is_unset() {
        let codec = ValueCodec::lenient();
        let text = def(PropertyType::Text);
        assert_eq!(
            codec.decode(&text, &"  hello ".into()).unwrap(),
            Some(PropertyValue::Text("hello".into()))
        );
        assert_eq!(codec.decode(&text, &"   ".into()).unwrap(), None);
        assert_eq!(codec.decode(&text, &"".into()).unwrap(), None);
    }

    #[test]
    fn malformed_number_degrades_to_unset_when_lenient() {
        let codec = ValueCodec::lenient();
        let number = def(PropertyType::Number);
        assert_eq!(
            codec.decode(&number, &" 3.5 ".into()).unwrap(),
            Some(PropertyValue::Number(3.5))
        );
        assert_eq!(codec.decode(&number, &"three".into()).unwrap(), None);
        assert_eq!(codec.decode(&number, &"".into()).unwrap(), None);
        assert_eq!(codec.decode(&number, &RawValue::Number(f64::NAN)).unwrap(), None);
    }

    #[test]
    fn malformed_number_errors_when_strict() {
        let codec = ValueCodec::strict();
        let number = def(PropertyType::Number);
        let err = codec.decode(&number, &"three".into()).unwrap_err();
        assert!(matches!(err, FieldsError::InvalidValue { .. }));
        // empty is still unset, not an error
        assert_eq!(codec.decode(&number, &"".into()).unwrap(), None);
    }

    #[test]
    fn dates_are_normalized_to_utc_milliseconds() {
        let codec = ValueCodec::lenient();
        let date = def(PropertyType::Date);
        let decoded = codec
            .decode(&date, &"2024-03-01T10:00:00.123456+02:00".into())
            .unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(decoded, Some(PropertyValue::Date(expected)));

        let bare = codec.decode(&date, &"2024-03-01".into()).unwrap();
        assert_eq!(
            bare,
            Some(PropertyValue::Date(
                Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
            ))
        );
        assert_eq!(codec.decode(&date, &"next tuesday".into()).unwrap(), None);
        assert!(ValueCodec::strict()
            .decode(&date, &"next tuesday".into())
            .is_err());
    }

    #[test]
    fn booleans_are_never_unset_once_touched() {
        let codec = ValueCodec::lenient();
        let flag = def(PropertyType::Boolean);
        assert_eq!(
            codec.decode(&flag, &RawValue::Bool(false)).unwrap(),
            Some(PropertyValue::Bool(false))
        );
        assert_eq!(
            codec.decode(&flag, &"".into()).unwrap(),
            Some(PropertyValue::Bool(false))
        );
        assert_eq!(
            codec.decode(&flag, &"Yes".into()).unwrap(),
            Some(PropertyValue::Bool(true))
        );
        assert_eq!(
            codec.decode(&flag, &"maybe".into()).unwrap(),
            Some(PropertyValue::Bool(false))
        );
        assert!(ValueCodec::strict().decode(&flag, &"maybe".into()).is_err());
    }

    #[test]
    fn dropdown_is_trusted_when_lenient_and_checked_when_strict() {
        let stage = with_options(def(PropertyType::Dropdown), &["Draft", "Review"]);
        assert_eq!(
            ValueCodec::lenient().decode(&stage, &"Shipped".into()).unwrap(),
            Some(PropertyValue::Dropdown("Shipped".into()))
        );
        assert!(ValueCodec::strict().decode(&stage, &"Shipped".into()).is_err());
        assert_eq!(
            ValueCodec::strict().decode(&stage, &"Review".into()).unwrap(),
            Some(PropertyValue::Dropdown("Review".into()))
        );
    }

    #[test]
    fn url_protocol_is_only_checked_when_strict() {
        let link = def(PropertyType::Url);
        assert_eq!(
            ValueCodec::lenient().decode(&link, &"example.com".into()).unwrap(),
            Some(PropertyValue::Url("example.com".into()))
        );
        assert!(ValueCodec::strict().decode(&link, &"example.com".into()).is_err());
        assert!(ValueCodec::strict()
            .decode(&link, &"https://example.com".into())
            .is_ok());
    }

    #[test]
    fn freeform_tags_keep_duplicates() {
        let codec = ValueCodec::lenient();
        let tags = def(PropertyType::Tags);
        assert_eq!(
            codec.decode(&tags, &"a, b, ,a".into()).unwrap(),
            Some(PropertyValue::Tags(vec!["a".into(), "b".into(), "a".into()]))
        );
        assert_eq!(codec.decode(&tags, &RawValue::List(vec![" ".into()])).unwrap(), None);
    }

    #[test]
    fn restricted_tags_allow_options_and_present_values() {
        let codec = ValueCodec::lenient();
        let tags = with_options(def(PropertyType::Tags), &["red", "blue"]);
        let current = PropertyValue::Tags(vec!["legacy".into()]);
        let decoded = codec
            .decode_with_current(
                &tags,
                &RawValue::List(vec!["red".into(), "legacy".into(), "green".into(), "red".into()]),
                Some(&current),
            )
            .unwrap();
        assert_eq!(
            decoded,
            Some(PropertyValue::Tags(vec!["red".into(), "legacy".into()]))
        );
        assert!(ValueCodec::strict()
            .decode(&tags, &RawValue::List(vec!["green".into()]))
            .is_err());
    }

    #[test]
    fn encode_then_decode_round_trips_scalar_types() {
        let codec = ValueCodec::lenient();
        let cases = [
            (def(PropertyType::Text), PropertyValue::Text("Design review".into())),
            (def(PropertyType::Number), PropertyValue::Number(-12.25)),
            (def(PropertyType::Boolean), PropertyValue::Bool(false)),
            (def(PropertyType::Boolean), PropertyValue::Bool(true)),
            (
                def(PropertyType::Date),
                PropertyValue::Date(Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap()),
            ),
        ];
        for (def, value) in cases {
            let raw = codec.encode(&def, &value);
            assert_eq!(codec.decode(&def, &raw).unwrap(), Some(value));
        }
    }

    #[test]
    fn display_renders_unset_as_dash() {
        assert_eq!(display_value(None), "—");
        assert_eq!(display_value(Some(&PropertyValue::Tags(vec![]))), "—");
        assert_eq!(display_value(Some(&PropertyValue::Bool(false))), "No");
        assert_eq!(
            display_value(Some(&PropertyValue::Tags(vec!["a".into(), "b".into()]))),
            "a, b"
        );
    }
}
