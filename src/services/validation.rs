use once_cell::sync::Lazy;
use regex::Regex;

use crate::services::error::ServiceError;
use crate::services::models::Registration;

const PASSWORD_SPECIALS: &str = "@$!%*?&";
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USER_NAME_LENGTH: usize = 256;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[\w!#$%&'*+\-/=?\^_`{|}~]+(\.[\w!#$%&'*+\-/=?\^_`{|}~]+)*@((([\-\w]+\.)+[a-zA-Z]{2,4})|(([0-9]{1,3}\.){3}[0-9]{1,3}))$"#,
    )
    .expect("email pattern compiles")
});

pub fn require(field: &'static str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(field, format!("{field} is required")));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    require("emailId", email)?;
    if !EMAIL.is_match(email) {
        return Err(ServiceError::validation(
            "emailId",
            "You have entered an invalid email address",
        ));
    }
    Ok(())
}

/// At least eight characters drawn from letters, digits and `@$!%*?&`, with
/// one of each: lowercase, uppercase, digit, special.
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    require("password", password)?;

    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let strong = password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if !(allowed && strong) {
        return Err(ServiceError::validation(
            "password",
            "Minimum eight characters, at least one uppercase letter, one lowercase letter, one number and one special character",
        ));
    }
    Ok(())
}

pub fn validate_registration(registration: &Registration) -> Result<(), ServiceError> {
    require("userName", &registration.user_name)?;
    if registration.user_name.len() > MAX_USER_NAME_LENGTH {
        return Err(ServiceError::validation("userName", "userName is too long"));
    }
    validate_email(&registration.email_id)?;
    validate_password(&registration.password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), ServiceError>) -> &'static str {
        match result {
            Err(ServiceError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Test@123").is_ok());
        assert!(validate_password("Aa1!Aa1!Aa1!").is_ok());

        for weak in ["", "Test@12", "test@123", "TEST@123", "Test@abc", "Test1234", "Test@123 "] {
            assert_eq!(field_of(validate_password(weak)), "password", "accepted {weak:?}");
        }
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("sample@example.com").is_ok());
        assert!(validate_email("first.last+todo@mail.example.org").is_ok());
        assert!(validate_email("user@10.0.0.1").is_ok());

        for bad in ["", "plainaddress", "@example.com", "user@", "user@example", "user@@example.com"] {
            assert_eq!(field_of(validate_email(bad)), "emailId", "accepted {bad:?}");
        }
    }

    #[test]
    fn registration_checks_fields_in_order() {
        let mut registration = Registration {
            user_name: " ".to_string(),
            email_id: "bad".to_string(),
            password: "weak".to_string(),
        };
        assert_eq!(field_of(validate_registration(&registration)), "userName");

        registration.user_name = "newuser".to_string();
        assert_eq!(field_of(validate_registration(&registration)), "emailId");

        registration.email_id = "new@example.com".to_string();
        assert_eq!(field_of(validate_registration(&registration)), "password");

        registration.password = "Str0ng!pass".to_string();
        assert!(validate_registration(&registration).is_ok());
    }
}
