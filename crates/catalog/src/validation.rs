//! Typed input structs and the checks that turn them into validated values.
//!
//! Each `validate_*` function runs every check and returns either the
//! validated value or the complete list of [`FieldError`]s, so a form can
//! show all of its problems at once.

use serde::{Deserialize, Serialize};

use storefinder_core::{Email, EmailError, FieldError, GeoPoint, Location, Rating, Slug};

/// Raw store fields as submitted by an author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreInput {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub address: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Filename from the upload service. On update, `None` keeps the
    /// current photo.
    pub photo: Option<String>,
}

/// A store input that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidStore {
    /// Trimmed.
    pub name: String,
    /// Base slug derived from `name`, before collision resolution.
    pub base_slug: Slug,
    pub description: String,
    pub tags: Vec<String>,
    pub location: Location,
    pub photo: Option<String>,
}

/// Raw review fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewInput {
    pub text: String,
    pub rating: Option<i64>,
}

/// A review input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReview {
    pub text: String,
    pub rating: Rating,
}

/// Raw registration form.
///
/// The passwords are only compared here; storing credentials belongs to the
/// authentication service.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl std::fmt::Debug for RegisterInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterInput")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirm", &"[REDACTED]")
            .finish()
    }
}

/// Raw account-settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountInput {
    pub name: String,
    pub email: String,
}

/// A validated name/email pair, shared by registration and account update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfile {
    pub name: String,
    pub email: Email,
}

/// Validate a store submission.
///
/// Tags are trimmed, blanks dropped and duplicates removed keeping the
/// first occurrence.
///
/// # Errors
///
/// Returns every failing field: `name`, `address`, `coordinates`.
pub fn validate_store(input: &StoreInput) -> Result<ValidStore, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = input.name.trim().to_owned();
    let base_slug = if name.is_empty() {
        errors.push(FieldError::new("name", "Please enter a store name!"));
        None
    } else {
        match Slug::derive(&name) {
            Ok(slug) => Some(slug),
            Err(e) => {
                errors.push(FieldError::new("name", e.to_string()));
                None
            }
        }
    };

    let address = input.address.trim().to_owned();
    if address.is_empty() {
        errors.push(FieldError::new("address", "Please supply an address!"));
    }

    let coordinates = match (input.longitude, input.latitude) {
        (Some(lng), Some(lat)) => match GeoPoint::new(lng, lat) {
            Ok(point) => Some(point),
            Err(e) => {
                errors.push(FieldError::new("coordinates", e.to_string()));
                None
            }
        },
        _ => {
            errors.push(FieldError::new("coordinates", "Please supply coordinates"));
            None
        }
    };

    let (Some(base_slug), Some(coordinates)) = (base_slug, coordinates) else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidStore {
        name,
        base_slug,
        description: input.description.trim().to_owned(),
        tags: normalize_tags(&input.tags),
        location: Location {
            coordinates,
            address,
        },
        photo: input
            .photo
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned),
    })
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|seen| seen == tag) {
            out.push(tag.to_owned());
        }
    }
    out
}

/// Validate a review submission.
///
/// # Errors
///
/// Returns every failing field: `text`, `rating`.
pub fn validate_review(input: &ReviewInput) -> Result<ValidReview, Vec<FieldError>> {
    let mut errors = Vec::new();

    let text = input.text.trim().to_owned();
    if text.is_empty() {
        errors.push(FieldError::new("text", "Your review must have text!"));
    }

    let rating = match input.rating {
        None => {
            errors.push(FieldError::new("rating", "You must supply a rating!"));
            None
        }
        Some(value) => match Rating::new(value) {
            Ok(rating) => Some(rating),
            Err(e) => {
                errors.push(FieldError::new("rating", e.to_string()));
                None
            }
        },
    };

    match rating {
        Some(rating) if errors.is_empty() => Ok(ValidReview { text, rating }),
        _ => Err(errors),
    }
}

/// Validate a registration form.
///
/// # Errors
///
/// Returns every failing field: `name`, `email`, `password`,
/// `password_confirm`.
pub fn validate_registration(input: &RegisterInput) -> Result<ValidProfile, Vec<FieldError>> {
    let mut errors = Vec::new();
    let profile = check_profile(&input.name, &input.email, &mut errors);

    if input.password.is_empty() {
        errors.push(FieldError::new("password", "You must supply a password!"));
    }
    if input.password_confirm.is_empty() {
        errors.push(FieldError::new(
            "password_confirm",
            "You must supply a password confirmation!",
        ));
    } else if input.password_confirm != input.password {
        errors.push(FieldError::new(
            "password_confirm",
            "Oops, your passwords do not match!",
        ));
    }

    match profile {
        Some(profile) if errors.is_empty() => Ok(profile),
        _ => Err(errors),
    }
}

/// Validate an account-settings form.
///
/// # Errors
///
/// Returns every failing field: `name`, `email`.
pub fn validate_account(input: &AccountInput) -> Result<ValidProfile, Vec<FieldError>> {
    let mut errors = Vec::new();
    match check_profile(&input.name, &input.email, &mut errors) {
        Some(profile) if errors.is_empty() => Ok(profile),
        _ => Err(errors),
    }
}

fn check_profile(name: &str, email: &str, errors: &mut Vec<FieldError>) -> Option<ValidProfile> {
    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "You must supply a name!"));
    }

    let email = match Email::parse(email) {
        Ok(email) => Some(email),
        Err(EmailError::Empty) => {
            errors.push(FieldError::new("email", "Please supply an email address"));
            None
        }
        Err(_) => {
            errors.push(FieldError::new("email", "That email is not valid!"));
            None
        }
    };

    email
        .filter(|_| !name.is_empty())
        .map(|email| ValidProfile {
            name: name.to_owned(),
            email,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    fn store_input() -> StoreInput {
        StoreInput {
            name: "  Cool Cafe ".to_owned(),
            description: " Nice coffee ".to_owned(),
            tags: vec![
                "Wifi".to_owned(),
                " ".to_owned(),
                " Open Late".to_owned(),
                "Wifi".to_owned(),
            ],
            address: "1 Main St".to_owned(),
            longitude: Some(-79.4),
            latitude: Some(43.6),
            photo: Some(String::new()),
        }
    }

    #[test]
    fn test_validate_store_normalizes() {
        let store = validate_store(&store_input()).unwrap();
        assert_eq!(store.name, "Cool Cafe");
        assert_eq!(store.base_slug.as_str(), "cool-cafe");
        assert_eq!(store.description, "Nice coffee");
        assert_eq!(store.tags, ["Wifi", "Open Late"]);
        assert_eq!(store.photo, None);
    }

    #[test]
    fn test_validate_store_collects_all_errors() {
        let input = StoreInput {
            name: "   ".to_owned(),
            longitude: Some(-79.4),
            ..StoreInput::default()
        };
        let errors = validate_store(&input).unwrap_err();
        assert_eq!(fields(&errors), ["name", "address", "coordinates"]);
    }

    #[test]
    fn test_validate_store_rejects_bad_coordinates() {
        let input = StoreInput {
            latitude: Some(123.0),
            ..store_input()
        };
        let errors = validate_store(&input).unwrap_err();
        assert_eq!(fields(&errors), ["coordinates"]);
    }

    #[test]
    fn test_validate_store_rejects_unsluggable_name() {
        let input = StoreInput {
            name: "???".to_owned(),
            ..store_input()
        };
        let errors = validate_store(&input).unwrap_err();
        assert_eq!(fields(&errors), ["name"]);
    }

    #[test]
    fn test_validate_review() {
        let ok = validate_review(&ReviewInput {
            text: " Great ".to_owned(),
            rating: Some(5),
        })
        .unwrap();
        assert_eq!(ok.text, "Great");
        assert_eq!(ok.rating.value(), 5);

        let errors = validate_review(&ReviewInput {
            text: String::new(),
            rating: Some(6),
        })
        .unwrap_err();
        assert_eq!(fields(&errors), ["text", "rating"]);

        let errors = validate_review(&ReviewInput {
            text: "ok".to_owned(),
            rating: None,
        })
        .unwrap_err();
        assert_eq!(fields(&errors), ["rating"]);
    }

    #[test]
    fn test_validate_registration() {
        let input = RegisterInput {
            name: "Wes".to_owned(),
            email: " WES@Example.com".to_owned(),
            password: "hunter2".to_owned(),
            password_confirm: "hunter2".to_owned(),
        };
        let profile = validate_registration(&input).unwrap();
        assert_eq!(profile.email.as_str(), "wes@example.com");

        let mismatch = RegisterInput {
            password_confirm: "hunter3".to_owned(),
            ..input.clone()
        };
        let errors = validate_registration(&mismatch).unwrap_err();
        assert_eq!(fields(&errors), ["password_confirm"]);
        assert_eq!(errors[0].message, "Oops, your passwords do not match!");

        let errors = validate_registration(&RegisterInput::default()).unwrap_err();
        assert_eq!(
            fields(&errors),
            ["name", "email", "password", "password_confirm"]
        );
    }

    #[test]
    fn test_register_input_debug_redacts_passwords() {
        let input = RegisterInput {
            password: "hunter2".to_owned(),
            password_confirm: "hunter2".to_owned(),
            ..RegisterInput::default()
        };
        assert!(!format!("{input:?}").contains("hunter2"));
    }

    #[test]
    fn test_validate_account_bad_email() {
        let errors = validate_account(&AccountInput {
            name: "Wes".to_owned(),
            email: "not-an-email".to_owned(),
        })
        .unwrap_err();
        assert_eq!(errors, [FieldError::new("email", "That email is not valid!")]);
    }
}
