use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotifierError;

/// Outcome of a finished build, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl BuildResult {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Failure => "FAILURE",
            BuildResult::NotBuilt => "NOT_BUILT",
            BuildResult::Aborted => "ABORTED",
        }
    }

    pub fn is_worse_than(self, other: BuildResult) -> bool {
        self > other
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildResult {
    type Err = NotifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(BuildResult::Success),
            "UNSTABLE" => Ok(BuildResult::Unstable),
            "FAILURE" => Ok(BuildResult::Failure),
            "NOT_BUILT" => Ok(BuildResult::NotBuilt),
            "ABORTED" => Ok(BuildResult::Aborted),
            other => Err(NotifierError::Validation(format!(
                "Unknown build result: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(BuildResult::Failure.is_worse_than(BuildResult::Success));
        assert!(BuildResult::Unstable.is_worse_than(BuildResult::Success));
        assert!(BuildResult::Aborted.is_worse_than(BuildResult::Failure));
        assert!(!BuildResult::Success.is_worse_than(BuildResult::Success));
    }

    #[test]
    fn test_names_match_serde() {
        for result in [
            BuildResult::Success,
            BuildResult::Unstable,
            BuildResult::Failure,
            BuildResult::NotBuilt,
            BuildResult::Aborted,
        ] {
            let json = serde_json::to_string(&result).unwrap();
            assert_eq!(json, format!("\"{}\"", result));
            assert_eq!(result.as_str().parse::<BuildResult>().unwrap(), result);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("failure".parse::<BuildResult>().unwrap(), BuildResult::Failure);
        assert!("BROKEN".parse::<BuildResult>().is_err());
    }
}
