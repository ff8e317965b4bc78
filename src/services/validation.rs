use crate::models::Demographic;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DELETE_CONFIRMATION: &str = "DELETE";

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    PasswordMismatch,
    NameRequired,
    InvalidEmail,
    WeakPassword,
    MissingDemographics,
    DeleteNotConfirmed,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ValidationError::PasswordMismatch => "Passwords do not match.",
            ValidationError::NameRequired => "Name is required.",
            ValidationError::InvalidEmail => "Invalid email address.",
            ValidationError::WeakPassword => "Password is too weak. Please use a stronger password.",
            ValidationError::MissingDemographics => {
                "Please fill in all required demographic information."
            }
            ValidationError::DeleteNotConfirmed => "Please type DELETE to confirm account deletion.",
        };
        f.write_str(msg)
    }
}

pub struct SignupForm<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: Option<&'a str>,
    pub first_name: &'a str,
}

/// Checks run in the order a user would see them on the form.
pub fn validate_signup(form: &SignupForm) -> Result<(), ValidationError> {
    if let Some(confirm) = form.confirm_password {
        if confirm != form.password {
            return Err(ValidationError::PasswordMismatch);
        }
    }
    if form.first_name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if !is_plausible_email(form.email) {
        return Err(ValidationError::InvalidEmail);
    }
    validate_password(form.password)
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

pub fn validate_demographics(demographic: &Demographic) -> Result<(), ValidationError> {
    let present = |v: &Option<String>| v.as_deref().map(str::trim).is_some_and(|s| !s.is_empty());

    if !present(&demographic.date_of_birth)
        || !present(&demographic.gender)
        || demographic.height_cm.is_none()
        || demographic.weight_kg.is_none()
    {
        return Err(ValidationError::MissingDemographics);
    }
    Ok(())
}

/// Only the literal, case-sensitive word counts.
pub fn confirm_deletion(input: &str) -> Result<(), ValidationError> {
    if input == DELETE_CONFIRMATION {
        Ok(())
    } else {
        Err(ValidationError::DeleteNotConfirmed)
    }
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form<'a>(password: &'a str, confirm: Option<&'a str>, name: &'a str) -> SignupForm<'a> {
        SignupForm {
            email: "ana@example.com",
            password,
            confirm_password: confirm,
            first_name: name,
        }
    }

    #[test]
    fn test_signup_rejects_mismatch() {
        let err = validate_signup(&form("secret1", Some("secret2"), "Ana")).unwrap_err();
        assert_eq!(err, ValidationError::PasswordMismatch);
        assert_eq!(err.to_string(), "Passwords do not match.");
    }

    #[test]
    fn test_signup_requires_name() {
        let err = validate_signup(&form("secret1", Some("secret1"), "   ")).unwrap_err();
        assert_eq!(err.to_string(), "Name is required.");
    }

    #[test]
    fn test_signup_accepts_without_confirmation_field() {
        assert!(validate_signup(&form("secret1", None, "Ana")).is_ok());
    }

    #[test]
    fn test_signup_rejects_short_password() {
        let err = validate_signup(&form("abc", Some("abc"), "Ana")).unwrap_err();
        assert_eq!(err, ValidationError::WeakPassword);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("no-at-sign"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("a@localhost"));
        assert!(!is_plausible_email("a b@example.com"));
    }

    #[test]
    fn test_demographics_required() {
        let mut d = Demographic {
            date_of_birth: Some("1990-04-01".to_string()),
            gender: Some("male".to_string()),
            height_cm: Some(180.0),
            weight_kg: Some(80.0),
            ..Default::default()
        };
        assert!(validate_demographics(&d).is_ok());

        d.gender = Some(String::new());
        assert_eq!(validate_demographics(&d), Err(ValidationError::MissingDemographics));

        d.gender = Some("male".to_string());
        d.weight_kg = None;
        assert_eq!(validate_demographics(&d), Err(ValidationError::MissingDemographics));
    }

    #[test]
    fn test_delete_requires_exact_word() {
        assert!(confirm_deletion("DELETE").is_ok());
        assert!(confirm_deletion("delete").is_err());
        assert!(confirm_deletion(" DELETE").is_err());
        assert!(confirm_deletion("").is_err());
    }
}
