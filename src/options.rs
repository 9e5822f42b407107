//! OCR processing options and the default/override overlay.
//!
//! [`OcrOptions`] is an ordered map from option name to [`OptionValue`].
//! The four keys every request starts from are named constants here; any
//! other key a caller adds is carried through untouched and handed to the
//! engine, which is the only place option semantics are interpreted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Straighten pages scanned at a slight angle. Default: `true`.
pub const DESKEW: &str = "deskew";
/// Detect and correct page orientation. Default: `true`.
pub const ROTATE_PAGES: &str = "rotate_pages";
/// Remove page background before OCR. Default: `false`.
pub const REMOVE_BACKGROUND: &str = "remove_background";
/// Let the engine report its own progress. Default: `true`.
pub const PROGRESS_INDICATOR: &str = "progress_indicator";

/// A single option value as passed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    /// Parse a textual value (CLI flag, form field) into the narrowest variant.
    ///
    /// `true/false/yes/no/on/off` become booleans, then integers, then
    /// floats; anything else stays text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => return OptionValue::Bool(true),
            "false" | "no" | "off" => return OptionValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return OptionValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return OptionValue::Float(f);
        }
        OptionValue::Text(trimmed.to_string())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Float(x) => write!(f, "{x}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

/// Caller-supplied entries overlaid onto the defaults.
pub type OptionOverrides = BTreeMap<String, OptionValue>;

/// The fully resolved option set handed to the OCR engine.
///
/// # Example
/// ```rust
/// use scan2pdf::{merge_options, OcrOptions, OptionOverrides, OptionValue};
///
/// let mut overrides = OptionOverrides::new();
/// overrides.insert("remove_background".into(), OptionValue::Bool(true));
/// overrides.insert("optimize".into(), OptionValue::Int(3));
///
/// let merged = merge_options(&OcrOptions::default(), &overrides);
/// assert!(merged.deskew());
/// assert!(merged.remove_background());
/// assert_eq!(merged.get("optimize"), Some(&OptionValue::Int(3)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OcrOptions {
    entries: BTreeMap<String, OptionValue>,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self::empty()
            .with(DESKEW, true)
            .with(ROTATE_PAGES, true)
            .with(REMOVE_BACKGROUND, false)
            .with(PROGRESS_INDICATOR, true)
    }
}

impl OcrOptions {
    /// An option set with no entries at all, not even the defaults.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn deskew(&self) -> bool {
        self.flag(DESKEW)
    }

    pub fn rotate_pages(&self) -> bool {
        self.flag(ROTATE_PAGES)
    }

    pub fn remove_background(&self) -> bool {
        self.flag(REMOVE_BACKGROUND)
    }

    pub fn progress_indicator(&self) -> bool {
        self.flag(PROGRESS_INDICATOR)
    }

    // A key that is missing or not a boolean reads as false.
    fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(OptionValue::as_bool).unwrap_or(false)
    }
}

impl From<BTreeMap<String, OptionValue>> for OcrOptions {
    fn from(entries: BTreeMap<String, OptionValue>) -> Self {
        Self { entries }
    }
}

/// Overlay `overrides` onto `defaults`, key by key.
///
/// Every override key ends up in the result with the override's value; every
/// default key the overrides do not mention keeps its default. Values are not
/// checked against any schema.
pub fn merge_options(defaults: &OcrOptions, overrides: &OptionOverrides) -> OcrOptions {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.entries.insert(key.clone(), value.clone());
    }
    merged
}

/// Parse a `key=value` pair as given on the command line.
///
/// Dashes in the key are folded to underscores so `--set rotate-pages=false`
/// and `--set rotate_pages=false` address the same option. A bare `key`
/// means `key=true`.
pub fn parse_override(spec: &str) -> Option<(String, OptionValue)> {
    let (key, value) = match spec.split_once('=') {
        Some((k, v)) => (k, OptionValue::parse(v)),
        None => (spec, OptionValue::Bool(true)),
    };
    let key = key.trim().replace('-', "_");
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}
