use std::fmt;

use crate::users::dto::{UserInput, UserPatch};

/// Fields every persisted user must carry, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    CurrentPassword,
    Email,
    Name,
}

impl RequiredField {
    pub fn as_str(self) -> &'static str {
        match self {
            RequiredField::CurrentPassword => "CurrentPassword",
            RequiredField::Email => "Email",
            RequiredField::Name => "Name",
        }
    }
}

/// The required fields a request left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    missing: Vec<RequiredField>,
}

impl ValidationError {
    pub fn missing(&self) -> &[RequiredField] {
        &self.missing
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Please provide all fields, including:")?;
        for field in &self.missing {
            write!(f, " {}", field.as_str())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn check(fields: [(RequiredField, bool); 3]) -> Result<(), ValidationError> {
    let missing: Vec<RequiredField> = fields
        .into_iter()
        .filter(|(_, empty)| *empty)
        .map(|(field, _)| field)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

/// Checks that password, email and name are all non-empty.
///
/// Hands the input back untouched so calls can be chained.
pub fn validate_minimum_fields(user: &UserInput) -> Result<&UserInput, ValidationError> {
    check([
        (RequiredField::CurrentPassword, user.password.is_empty()),
        (RequiredField::Email, user.email.is_empty()),
        (RequiredField::Name, user.name.is_empty()),
    ])?;
    Ok(user)
}

impl UserPatch {
    /// A patch may omit fields, but any field it supplies must be non-empty.
    pub fn validate(&self) -> Result<&Self, ValidationError> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(str::is_empty);
        check([
            (RequiredField::CurrentPassword, blank(&self.password)),
            (RequiredField::Email, blank(&self.email)),
            (RequiredField::Name, blank(&self.name)),
        ])?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub() -> UserInput {
        UserInput {
            email: "cinnamon@nice.com".into(),
            name: "Ray May".into(),
            password: "P0werpuff".into(),
        }
    }

    #[test]
    fn complete_input_passes_unchanged() {
        let user = stub();
        let checked = validate_minimum_fields(&user).expect("all fields present");
        assert_eq!(checked, &stub());
    }

    #[test]
    fn missing_name_is_reported() {
        let mut user = stub();
        user.name.clear();
        let err = validate_minimum_fields(&user).unwrap_err();
        assert_eq!(err.to_string(), "Please provide all fields, including: Name");
        assert_eq!(err.missing(), &[RequiredField::Name]);
    }

    #[test]
    fn missing_fields_are_listed_in_fixed_order() {
        let user = UserInput {
            name: "Ray May".into(),
            ..UserInput::default()
        };
        let err = validate_minimum_fields(&user).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please provide all fields, including: CurrentPassword Email"
        );

        let err = validate_minimum_fields(&UserInput::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please provide all fields, including: CurrentPassword Email Name"
        );
    }

    #[test]
    fn patch_allows_absent_but_not_blank_fields() {
        assert!(UserPatch::default().validate().is_ok());

        let patch = UserPatch {
            email: Some(String::new()),
            name: Some("New Name".into()),
            password: None,
        };
        let err = patch.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please provide all fields, including: Email");
    }
}
