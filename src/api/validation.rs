use super::ApiError;

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }

    if trimmed.len() > 150 {
        return Err(ApiError::validation(
            "Username must be 150 characters or less",
        ));
    }

    Ok(trimmed)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    // Shape check only; deliverability is the mailer's problem
    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(ApiError::validation("Email address is not valid"));
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ApiError::validation("Email address is not valid"));
    }

    Ok(trimmed)
}

pub fn validate_token_id(token_id: &str) -> Result<&str, ApiError> {
    if token_id.is_empty() {
        return Err(ApiError::validation("Reset id is required"));
    }

    if !token_id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ApiError::validation("Reset id is not valid"));
    }

    Ok(token_id)
}
