//! Input validation for registration, account, question and answer forms.
//!
//! Every function collects all problems with the input and reports them in a
//! single [`CoreError::Validation`], so a client can fix a form in one pass.
//! Uniqueness of usernames and emails needs the store and is checked by the
//! HTTP layer.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Column width of `users.username`.
pub const MAX_USERNAME_LEN: usize = 20;

/// Column width of `users.email`.
pub const MAX_EMAIL_LEN: usize = 50;

/// Column width of `questions.title`.
pub const MAX_TITLE_LEN: usize = 200;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validate the fields of a registration form.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), CoreError> {
    let mut errors = Vec::new();
    check_username(username, &mut errors);
    check_email(email, &mut errors);

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if password != confirm_password {
        errors.push("Passwords do not match".to_string());
    }

    into_result(errors)
}

/// Validate an account update. `None` fields are left unchanged and skipped.
pub fn validate_account_update(
    username: Option<&str>,
    email: Option<&str>,
) -> Result<(), CoreError> {
    let mut errors = Vec::new();
    if let Some(username) = username {
        check_username(username, &mut errors);
    }
    if let Some(email) = email {
        check_email(email, &mut errors);
    }
    into_result(errors)
}

/// Validate a question submission. The description may be empty.
pub fn validate_question(title: &str) -> Result<(), CoreError> {
    let mut errors = Vec::new();
    let title = title.trim();
    if title.is_empty() {
        errors.push("Question title is required".to_string());
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(format!(
            "Question title must be at most {MAX_TITLE_LEN} characters"
        ));
    }
    into_result(errors)
}

/// Validate an answer submission.
pub fn validate_answer(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation("Answer text is required".into()));
    }
    Ok(())
}

fn check_username(username: &str, errors: &mut Vec<String>) {
    let username = username.trim();
    if username.is_empty() {
        errors.push("Username is required".to_string());
    } else if username.chars().count() > MAX_USERNAME_LEN {
        errors.push(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        ));
    }
}

fn check_email(email: &str, errors: &mut Vec<String>) {
    if email.trim().is_empty() {
        errors.push("Email is required".to_string());
    } else if email.chars().count() > MAX_EMAIL_LEN {
        errors.push(format!("Email must be at most {MAX_EMAIL_LEN} characters"));
    } else if !email.validate_email() {
        errors.push("Email address is not valid".to_string());
    }
}

fn into_result(errors: Vec<String>) -> Result<(), CoreError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors.join("; ")))
    }
}
