//! Validated text primitives shared across the chart crates.
//!
//! Form inputs arrive as free text. These wrappers keep the text exactly as the user typed
//! it (so it can be echoed back into a save payload) while guaranteeing that it is usable.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input text does not parse as a finite decimal number
    #[error("'{0}' is not a number")]
    NotNumeric(String),
}

/// Configuration text that must not be blank: concept UUIDs, encounter and form UUIDs,
/// base paths.
///
/// Surrounding whitespace is dropped, so a YAML value of `" 5085AAAA… "` compares equal to
/// the code the server sends back on an observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// # Errors
    ///
    /// [`TextError::Empty`] if nothing but whitespace is left after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Empty),
            text => Ok(Self(text.to_owned())),
        }
    }

    /// The OpenMRS UUID of CIEL concept `id`: the number right-padded with `A` to 36
    /// characters, e.g. `5085` becomes `5085AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA`.
    pub fn ciel_concept(id: u32) -> Self {
        Self(format!("{id:A<36}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Serialised as a bare string; blank strings are rejected on the way in.
impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NonEmptyText::new(text).map_err(serde::de::Error::custom)
    }
}

/// A numeric measurement as typed by the user.
///
/// The original text (trimmed) is retained alongside the parsed value so that
/// `"36.5"` is echoed back as `"36.5"` rather than a re-formatted float.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericText {
    text: String,
    value: f64,
}

impl NumericText {
    /// Parses free text into a numeric measurement.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input and [`TextError::NotNumeric`] when the
    /// text is not a finite decimal number.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Self {
                text: trimmed.to_owned(),
                value,
            }),
            _ => Err(TextError::NotNumeric(trimmed.to_owned())),
        }
    }

    /// The text exactly as typed, minus surrounding whitespace.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl std::fmt::Display for NumericText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
