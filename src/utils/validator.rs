use validator::ValidationError;

pub const BLOOD_GROUPS: [&str; 8] = ["O-", "O+", "A-", "A+", "B-", "B+", "AB-", "AB+"];

pub fn validate_blood_group(group: &str) -> Result<(), ValidationError> {
    if BLOOD_GROUPS.contains(&group) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_blood_group"))
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::new("password_too_short"));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ValidationError::new("password_needs_uppercase"));
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(ValidationError::new("password_needs_lowercase"));
    }

    if !password.chars().any(|c| c.is_numeric()) {
        return Err(ValidationError::new("password_needs_number"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_groups() {
        for group in BLOOD_GROUPS {
            assert!(validate_blood_group(group).is_ok());
        }
        assert!(validate_blood_group("C+").is_err());
        assert!(validate_blood_group("ab+").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Longenough1").is_ok());
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }
}
