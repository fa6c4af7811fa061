//! Aggregating validation: every check in a [`Pipeline`] runs against the input
//! and all failures are reported together.

use std::fmt;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

type Check<T> = Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// Ordered list of independent checks over `T`.
///
/// Each check owns one field and returns the first problem it finds for that
/// field; checks never see each other's results.
pub struct Pipeline<T> {
    checks: Vec<(&'static str, Check<T>)>,
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self { checks: Vec::new() }
    }
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<F>(mut self, field: &'static str, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        self.checks.push((field, Box::new(check)));
        self
    }

    /// Run every check; `Err` carries all violations in declaration order.
    pub fn run(&self, input: &T) -> Result<(), Vec<Violation>> {
        let violations: Vec<Violation> = self
            .checks
            .iter()
            .filter_map(|(field, check)| check(input).err().map(|m| Violation::new(field, m)))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// Flatten violations into their messages.
pub fn messages(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(|v| v.message.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Login {
        email: String,
        password: String,
    }

    fn login_pipeline() -> Pipeline<Login> {
        Pipeline::new()
            .check("email", |l: &Login| {
                if l.email.contains('@') {
                    Ok(())
                } else {
                    Err("bad email".into())
                }
            })
            .check("password", |l: &Login| {
                if l.password.is_empty() {
                    Err("password required".into())
                } else {
                    Ok(())
                }
            })
    }

    #[test]
    fn reports_all_failures_in_order() {
        let err = login_pipeline()
            .run(&Login {
                email: "nope".into(),
                password: String::new(),
            })
            .unwrap_err();

        assert_eq!(err.len(), 2);
        assert_eq!(err[0].field, "email");
        assert_eq!(err[1].field, "password");
        assert_eq!(messages(&err), vec!["bad email", "password required"]);
    }

    #[test]
    fn passes_when_every_check_passes() {
        let p = login_pipeline();
        assert_eq!(p.len(), 2);
        assert!(p
            .run(&Login {
                email: "a@b.c".into(),
                password: "x".into(),
            })
            .is_ok());
    }

    #[test]
    fn empty_pipeline_accepts_anything() {
        let p: Pipeline<u8> = Pipeline::new();
        assert!(p.is_empty());
        assert!(p.run(&0).is_ok());
    }
}
