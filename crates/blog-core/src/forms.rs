//! Submitted form data and its validation.
//!
//! Fields arrive as optional strings. Before validation each field is trimmed
//! and blank values become `None`, so "required" covers both a missing and an
//! empty field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Comment submitted on a post's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(
        required(message = "This field is required."),
        length(max = 80, message = "Ensure this value has at most 80 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,
    #[validate(required(message = "This field is required."))]
    pub body: Option<String>,
}

/// Recommend-a-post-by-email form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EmailPostForm {
    #[validate(
        required(message = "This field is required."),
        length(max = 25, message = "Ensure this value has at most 25 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub to: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SearchForm {
    #[validate(required(message = "This field is required."))]
    pub query: Option<String>,
}

/// A validatable form.
pub trait Form: Validate + Sized {
    /// Normalise raw input before validation.
    fn clean(self) -> Self;
}

impl Form for CommentForm {
    fn clean(self) -> Self {
        Self {
            name: clean_field(self.name),
            email: clean_field(self.email),
            body: clean_field(self.body),
        }
    }
}

impl Form for EmailPostForm {
    fn clean(self) -> Self {
        Self {
            name: clean_field(self.name),
            email: clean_field(self.email),
            to: clean_field(self.to),
            comment: clean_field(self.comment),
        }
    }
}

impl Form for SearchForm {
    fn clean(self) -> Self {
        Self {
            query: clean_field(self.query),
        }
    }
}

fn clean_field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Clean and validate submitted data.
///
/// Returns the cleaned data when valid, otherwise a bound [`FormState`]
/// carrying the entered values and per-field messages.
pub fn bind<F: Form>(data: F) -> Result<F, FormState<F>> {
    let data = data.clean();
    match data.validate() {
        Ok(()) => Ok(data),
        Err(errors) => Err(FormState::bound(data, FormErrors::from(&errors))),
    }
}

/// Field name to error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Self(fields)
    }
}

/// A form as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState<F> {
    pub data: F,
    pub errors: FormErrors,
    pub is_bound: bool,
    pub is_valid: bool,
}

impl<F: Default> FormState<F> {
    /// An empty form that has not been submitted.
    pub fn unbound() -> Self {
        Self {
            data: F::default(),
            errors: FormErrors::default(),
            is_bound: false,
            is_valid: false,
        }
    }
}

impl<F> FormState<F> {
    /// A submitted form; valid exactly when `errors` is empty.
    pub fn bound(data: F, errors: FormErrors) -> Self {
        Self {
            is_bound: true,
            is_valid: errors.is_empty(),
            data,
            errors,
        }
    }

    pub fn valid(data: F) -> Self {
        Self::bound(data, FormErrors::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &str = "This field is required.";
    const INVALID_EMAIL: &str = "Enter a valid email address.";

    fn comment(name: &str, email: &str, body: &str) -> CommentForm {
        CommentForm {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            body: Some(body.to_string()),
        }
    }

    #[test]
    fn test_valid_comment_is_trimmed() {
        let form = bind(comment("  Ann ", "ann@example.com ", " Nice post")).unwrap();
        assert_eq!(form.name.as_deref(), Some("Ann"));
        assert_eq!(form.email.as_deref(), Some("ann@example.com"));
        assert_eq!(form.body.as_deref(), Some("Nice post"));
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let state = bind(comment("Ann", "not-an-email", "Nice post")).unwrap_err();
        assert!(state.is_bound);
        assert!(!state.is_valid);
        assert_eq!(state.errors.field("email"), Some(&[INVALID_EMAIL.to_string()][..]));
        assert_eq!(state.data.name.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_blank_fields_are_required() {
        let state = bind(comment("   ", "", "body")).unwrap_err();
        assert_eq!(state.errors.field("name"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(state.errors.field("email"), Some(&[REQUIRED.to_string()][..]));
        assert!(state.errors.field("body").is_none());
    }

    #[test]
    fn test_share_name_length() {
        let form = EmailPostForm {
            name: Some("x".repeat(26)),
            email: Some("a@example.com".into()),
            to: Some("b@example.com".into()),
            comment: None,
        };
        let state = bind(form).unwrap_err();
        assert_eq!(state.errors.fields().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_share_comment_is_optional() {
        let form = EmailPostForm {
            name: Some("Ann".into()),
            email: Some("a@example.com".into()),
            to: Some("b@example.com".into()),
            comment: Some("   ".into()),
        };
        let form = bind(form).unwrap();
        assert_eq!(form.comment, None);
    }

    #[test]
    fn test_share_requires_recipient() {
        let form = EmailPostForm {
            name: Some("Ann".into()),
            email: Some("a@example.com".into()),
            to: None,
            comment: None,
        };
        let state = bind(form).unwrap_err();
        assert_eq!(state.errors.field("to"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_whitespace_query_is_invalid() {
        let state = bind(SearchForm {
            query: Some("  ".into()),
        })
        .unwrap_err();
        assert!(state.errors.field("query").is_some());
    }

    #[test]
    fn test_bound_form_is_valid_only_without_errors() {
        let state = FormState::bound(SearchForm::default(), FormErrors::default());
        assert!(state.errors.is_empty());
        assert!(state.is_bound && state.is_valid);

        let state = bind(SearchForm::default()).unwrap_err();
        assert!(!state.errors.is_empty());
        assert!(state.is_bound && !state.is_valid);

        let unbound = FormState::<SearchForm>::unbound();
        assert!(unbound.errors.is_empty() && !unbound.is_bound);
    }

    #[test]
    fn test_form_state_serializes_errors_by_field() {
        let state = bind(comment("Ann", "bad", "x")).unwrap_err();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["errors"]["email"][0], INVALID_EMAIL);
        assert_eq!(json["is_valid"], false);
    }
}
