//! Non-fatal diagnostics raised while matching

use serde_json::Value;

/// Authoring problem found while aligning a differential with its base
#[derive(Debug, Clone, PartialEq)]
pub struct MatchIssue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    pub diagnostics: String,
    /// Element key (`path` or `path:sliceName`) the issue refers to
    pub location: Option<String>,
}

impl MatchIssue {
    pub fn error(code: IssueCode, diagnostics: String) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code,
            diagnostics,
            location: None,
        }
    }

    pub fn warning(code: IssueCode, diagnostics: String) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            code,
            diagnostics,
            location: None,
        }
    }

    pub fn with_location(mut self, location: String) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }

    fn to_json(&self) -> Value {
        let mut issue = serde_json::json!({
            "severity": self.severity.to_string().to_lowercase(),
            "code": self.code.to_string(),
            "diagnostics": self.diagnostics,
        });

        if let Some(ref loc) = self.location {
            issue["location"] = serde_json::json!([loc]);
        }

        issue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// Subset of the FHIR issue-type codes raised by the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    /// Slice name claimed twice, or an unnamed element repeated
    Duplicate,
    /// Differential element with no counterpart in the base
    NotFound,
    /// Slicing declared without discriminators
    Required,
    /// Slicing introduced without a slice entry
    Incomplete,
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Duplicate => "duplicate",
            Self::NotFound => "not-found",
            Self::Required => "required",
            Self::Incomplete => "incomplete",
        };
        write!(f, "{}", s)
    }
}

/// Render issues as a FHIR OperationOutcome resource
pub fn issues_to_operation_outcome<'a>(issues: impl IntoIterator<Item = &'a MatchIssue>) -> Value {
    serde_json::json!({
        "resourceType": "OperationOutcome",
        "issue": issues.into_iter().map(MatchIssue::to_json).collect::<Vec<_>>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_operation_outcome() {
        let issues = [
            MatchIssue::error(IssueCode::Duplicate, "slice 'dog' defined twice".to_string())
                .with_location("Patient.animal:dog".to_string()),
            MatchIssue::warning(IssueCode::Incomplete, "no slice entry".to_string()),
        ];

        let outcome = issues_to_operation_outcome(&issues);
        assert_eq!(outcome["resourceType"], "OperationOutcome");
        assert_eq!(outcome["issue"][0]["severity"], "error");
        assert_eq!(outcome["issue"][0]["code"], "duplicate");
        assert_eq!(outcome["issue"][0]["location"][0], "Patient.animal:dog");
        assert_eq!(outcome["issue"][1]["code"], "incomplete");
        assert!(outcome["issue"][1].get("location").is_none());
    }

    #[test]
    fn severity_helpers() {
        assert!(MatchIssue::error(IssueCode::NotFound, String::new()).is_error());
        assert!(!MatchIssue::warning(IssueCode::Required, String::new()).is_error());
    }
}
