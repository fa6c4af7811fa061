use modkit::validation::{Pipeline, Violation};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::model::{Credentials, NewAdmin, Role};

const MAX_NAME_CHARS: usize = 100;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static LOGIN_RULES: Lazy<Pipeline<Credentials>> = Lazy::new(|| {
    Pipeline::new()
        .check("email", |c: &Credentials| check_email(c.email.as_deref()))
        .check("password", |c: &Credentials| match c.password.as_deref() {
            Some(p) if !p.is_empty() => Ok(()),
            _ => Err("Password is required".into()),
        })
});

/// Lower-case and trim, the form emails are stored and looked up in.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn check_email(raw: Option<&str>) -> Result<(), String> {
    match raw.map(str::trim) {
        None | Some("") => Err("Email is required".into()),
        Some(e) if !EMAIL_RE.is_match(e) => Err("Please enter a valid email address".into()),
        Some(_) => Ok(()),
    }
}

pub fn validate_login(input: &Credentials) -> Result<(), Vec<Violation>> {
    LOGIN_RULES.run(input)
}

/// Create-admin rules; the minimum password length comes from configuration.
pub fn new_admin_rules(min_password_length: usize) -> Pipeline<NewAdmin> {
    Pipeline::new()
        .check("email", |a: &NewAdmin| check_email(a.email.as_deref()))
        .check("password", move |a: &NewAdmin| match a.password.as_deref() {
            None | Some("") => Err("Password is required".into()),
            Some(p) if p.chars().count() < min_password_length => Err(format!(
                "Password must be at least {min_password_length} characters long"
            )),
            Some(_) => Ok(()),
        })
        .check("name", |a: &NewAdmin| match a.name.as_deref().map(str::trim) {
            None | Some("") => Err("Name is required".into()),
            Some(n) if n.chars().count() > MAX_NAME_CHARS => {
                Err(format!("Name cannot exceed {MAX_NAME_CHARS} characters"))
            }
            Some(_) => Ok(()),
        })
        .check("role", |a: &NewAdmin| match a.role.as_deref() {
            Some(r) if r.parse::<Role>().is_err() => Err(format!(
                "Role must be one of: {}",
                Role::ALL.map(Role::as_str).join(", ")
            )),
            _ => Ok(()),
        })
}
