//! URL-safe store identifiers derived from display names.
//!
//! A slug is the lowercase, hyphenated transliteration of a store name.
//! Uniqueness is resolved by counting the existing members of the slug's
//! *family*: the base slug itself plus every `<base>-<digits>` variant.

use core::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Errors that can occur when deriving or parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The name produced no URL-safe characters.
    #[error("name must contain at least one letter or digit")]
    Empty,
    /// A stored slug contains characters outside `[a-z0-9-]`.
    #[error("slug contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A URL-safe, lowercase, hyphen-separated identifier.
///
/// ```
/// use storefinder_core::Slug;
///
/// let slug = Slug::derive("  Café & Bar: Downtown! ").unwrap();
/// assert_eq!(slug.as_str(), "cafe-and-bar-downtown");
///
/// assert_eq!(slug.with_collisions(0).as_str(), "cafe-and-bar-downtown");
/// assert_eq!(slug.with_collisions(2).as_str(), "cafe-and-bar-downtown-3");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive the base slug for a display name.
    ///
    /// The name is transliterated to ASCII first, so any script yields a
    /// readable slug ("Москва" reads as "moskva"). Letters are then
    /// lowercased, apostrophes dropped and `&` read as `and`; every other
    /// run of non-alphanumeric characters becomes a single hyphen.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if nothing URL-safe remains.
    pub fn derive(name: &str) -> Result<Self, SlugError> {
        let ascii = deunicode::deunicode_with_tofu(name, " ");
        let mut out = String::with_capacity(ascii.len());
        let mut pending_separator = false;

        for c in ascii.chars() {
            if c.is_ascii_alphanumeric() {
                let mut buf = [0u8; 4];
                let lower = c.to_ascii_lowercase();
                push_segment(&mut out, lower.encode_utf8(&mut buf), &mut pending_separator);
            } else if c == '\'' {
                // "Joe's" -> "joes"
            } else if c == '&' {
                pending_separator = true;
                push_segment(&mut out, "and", &mut pending_separator);
                pending_separator = true;
            } else {
                pending_separator = true;
            }
        }

        if out.is_empty() {
            return Err(SlugError::Empty);
        }

        Ok(Self(out))
    }

    /// Parse an already-derived slug (e.g. one read back from storage).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains characters outside
    /// `[a-z0-9-]`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidCharacter(bad));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Anchored, case-insensitive pattern matching this slug's family:
    /// the base itself or the base followed by `-` and optional digits.
    ///
    /// The returned source is valid both for the `regex` crate and for
    /// `PostgreSQL`'s `~*` operator.
    #[must_use]
    pub fn family_pattern(&self) -> String {
        format!("^({})((-[0-9]*$)?)$", regex::escape(&self.0))
    }

    /// Compiled, case-insensitive form of [`Self::family_pattern`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the regex engine rejects the pattern (for
    /// example by exceeding its size limit).
    pub fn family_regex(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&self.family_pattern())
            .case_insensitive(true)
            .build()
    }

    /// Apply the collision rule: with `existing` family members already
    /// stored, the new slug is `<base>-<existing + 1>`; with none it is the
    /// base unchanged.
    ///
    /// The suffix counts family members rather than taking the highest
    /// existing suffix, so concurrent writers deriving the same base can
    /// still produce duplicates.
    #[must_use]
    pub fn with_collisions(&self, existing: usize) -> Self {
        if existing == 0 {
            self.clone()
        } else {
            Self(format!("{}-{}", self.0, existing + 1))
        }
    }
}

/// Append a segment, emitting a hyphen first if a separator is pending.
fn push_segment(out: &mut String, segment: &str, pending: &mut bool) {
    if *pending && !out.is_empty() {
        out.push('-');
    }
    *pending = false;
    out.push_str(segment);
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_basic() {
        assert_eq!(Slug::derive("Cool Cafe").unwrap().as_str(), "cool-cafe");
        assert_eq!(Slug::derive("  Cool   Cafe  ").unwrap().as_str(), "cool-cafe");
    }

    #[test]
    fn test_derive_punctuation_and_apostrophes() {
        assert_eq!(
            Slug::derive("Joe's Pizza -- Est. 1999!").unwrap().as_str(),
            "joes-pizza-est-1999"
        );
    }

    #[test]
    fn test_derive_transliterates() {
        assert_eq!(Slug::derive("Crème Brûlée").unwrap().as_str(), "creme-brulee");
        assert_eq!(Slug::derive("Straße").unwrap().as_str(), "strasse");
        assert_eq!(Slug::derive("Fish & Chips").unwrap().as_str(), "fish-and-chips");
    }

    #[test]
    fn test_derive_non_latin_scripts() {
        assert_eq!(Slug::derive("Москва Кафе").unwrap().as_str(), "moskva-kafe");
        assert_eq!(Slug::derive("Joe’s Diner").unwrap().as_str(), "joes-diner");

        let tokyo = Slug::derive("東京").unwrap();
        let osaka = Slug::derive("大阪").unwrap();
        assert_ne!(tokyo, osaka);
        assert!(Slug::parse(tokyo.as_str()).is_ok());
        assert!(Slug::parse(osaka.as_str()).is_ok());
    }

    #[test]
    fn test_derive_keeps_non_latin_words_apart() {
        assert_eq!(Slug::derive("Café Москва").unwrap().as_str(), "cafe-moskva");
        assert_eq!(Slug::derive("Café Токио").unwrap().as_str(), "cafe-tokio");
    }

    #[test]
    fn test_derive_empty() {
        assert_eq!(Slug::derive("!!!"), Err(SlugError::Empty));
        assert_eq!(Slug::derive(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        assert_eq!(Slug::parse("Cool"), Err(SlugError::InvalidCharacter('C')));
        assert!(Slug::parse("cool-cafe-2").is_ok());
    }

    #[test]
    fn test_family_regex_anchored() {
        let re = Slug::derive("Cool Cafe").unwrap().family_regex().unwrap();
        assert!(re.is_match("cool-cafe"));
        assert!(re.is_match("cool-cafe-2"));
        assert!(re.is_match("COOL-CAFE-10"));
        assert!(re.is_match("cool-cafe-"));
        assert!(!re.is_match("cool-cafe-bar"));
        assert!(!re.is_match("very-cool-cafe"));
        assert!(!re.is_match("cool-cafes"));
    }

    #[test]
    fn test_with_collisions_counts() {
        let base = Slug::derive("Cool Cafe").unwrap();
        assert_eq!(base.with_collisions(0).as_str(), "cool-cafe");
        assert_eq!(base.with_collisions(1).as_str(), "cool-cafe-2");
        assert_eq!(base.with_collisions(2).as_str(), "cool-cafe-3");
    }
}
