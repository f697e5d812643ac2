use crate::error::ValidationError;
use crate::models::{NewComment, NewConfession, NewEarlyAccess};

pub const MAX_CONFESSION_LEN: usize = 1000;

/// Checks a confession draft and returns it with trimmed content.
pub fn validate_confession(mut new: NewConfession) -> Result<NewConfession, ValidationError> {
    if new.content.trim().is_empty() {
        return Err(ValidationError::EmptyConfession);
    }
    // length is checked on the raw draft, as typed
    if new.content.chars().count() > MAX_CONFESSION_LEN {
        return Err(ValidationError::ConfessionTooLong { max: MAX_CONFESSION_LEN });
    }
    new.content = new.content.trim().to_string();
    Ok(new)
}

pub fn validate_comment(mut new: NewComment) -> Result<NewComment, ValidationError> {
    let trimmed = new.content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    new.content = trimmed.to_string();
    Ok(new)
}

pub fn validate_early_access(new: NewEarlyAccess) -> Result<NewEarlyAccess, ValidationError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let email = new.email.trim();
    if !looks_like_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(NewEarlyAccess { email: email.to_string(), name: name.to_string() })
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else { return false };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}
