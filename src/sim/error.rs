//! Error taxonomy for level loading and world building
//!
//! Death and level completion are lifecycle states, never errors. Only
//! broken level data and broken derived data are represented here.

use std::fmt;

/// One problem found in level data or settings
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    /// What the problem belongs to (e.g. `object 'spikes'`, `settings`)
    pub subject: String,
    /// Offending field
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(subject: impl Into<String>, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field '{}': {}", self.subject, self.field, self.message)
    }
}

/// Simulation-side errors
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Missing or malformed level data; the level must not start
    Configuration(Vec<ConfigIssue>),
    /// Derived world data broke a structural invariant
    InvariantViolation(String),
}

impl SimError {
    /// Shorthand for a configuration error with a single issue
    pub fn config(subject: impl Into<String>, field: &'static str, message: impl Into<String>) -> Self {
        SimError::Configuration(vec![ConfigIssue::new(subject, field, message)])
    }

    /// Issues carried by a configuration error (empty otherwise)
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            SimError::Configuration(issues) => issues,
            SimError::InvariantViolation(_) => &[],
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Configuration(issues) => {
                write!(f, "configuration error")?;
                for (i, issue) in issues.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { "; " };
                    write!(f, "{sep}{issue}")?;
                }
                Ok(())
            }
            SimError::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for SimError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_issue() {
        let err = SimError::Configuration(vec![
            ConfigIssue::new("player 'p1'", "hitbox", "width must be positive"),
            ConfigIssue::new("object 'coin'", "positions", "no placements"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("configuration error: player 'p1'"));
        assert!(text.contains("; object 'coin' field 'positions'"));
        assert_eq!(err.issues().len(), 2);
    }
}
