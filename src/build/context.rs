use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{responsible_parties, BuildResult};

/// Result and change authors of one earlier build of the same job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub number: u64,
    /// `None` while running or when the record is incomplete
    #[serde(default)]
    pub result: Option<BuildResult>,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// Snapshot of a build taken when the notification fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    /// Full job name; folders are separated by `/`
    pub job_name: String,
    /// Host-relative job path such as `job/demo/`; derived from the name when absent
    #[serde(default)]
    pub project_url: Option<String>,
    pub build_number: u64,
    #[serde(default)]
    pub result: Option<BuildResult>,
    /// Environment scopes, lowest precedence first
    #[serde(default)]
    pub environment: Vec<BTreeMap<String, String>>,
    /// Build parameter scopes, lowest precedence first
    #[serde(default)]
    pub parameters: Vec<BTreeMap<String, String>>,
    /// Display names of the authors of this build's changes
    #[serde(default)]
    pub change_authors: Vec<String>,
    /// Earlier builds of the job, most recent first
    #[serde(default)]
    pub history: Vec<BuildSummary>,
}

impl BuildContext {
    pub fn new(job_name: impl Into<String>, build_number: u64) -> Self {
        Self {
            job_name: job_name.into(),
            build_number,
            ..Default::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_result(mut self, result: BuildResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_project_url(mut self, url: impl Into<String>) -> Self {
        self.project_url = Some(url.into());
        self
    }

    pub fn with_environment(mut self, scope: BTreeMap<String, String>) -> Self {
        self.environment.push(scope);
        self
    }

    pub fn with_parameters(mut self, scope: BTreeMap<String, String>) -> Self {
        self.parameters.push(scope);
        self
    }

    pub fn with_change_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.change_authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_history(mut self, history: Vec<BuildSummary>) -> Self {
        self.history = history;
        self
    }

    /// Job path relative to the host root, e.g. `job/demo/` or
    /// `job/team/job/demo/` for a job inside a folder.
    pub fn project_url(&self) -> String {
        if let Some(url) = &self.project_url {
            return url.clone();
        }
        self.job_name
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| format!("job/{}/", segment))
            .collect()
    }

    /// Result name, or an empty string while the result is unknown.
    pub fn result_name(&self) -> &'static str {
        self.result.map(BuildResult::as_str).unwrap_or("")
    }

    /// Responsible parties since the last healthy build.
    pub fn culprits(&self) -> Vec<&str> {
        responsible_parties(&self.change_authors, &self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_project_url_from_job_name() {
        assert_eq!(BuildContext::new("demo", 1).project_url(), "job/demo/");
        assert_eq!(
            BuildContext::new("team/demo", 1).project_url(),
            "job/team/job/demo/"
        );
    }

    #[test]
    fn test_explicit_project_url_wins() {
        let context = BuildContext::new("demo", 1).with_project_url("job/renamed/");
        assert_eq!(context.project_url(), "job/renamed/");
    }

    #[test]
    fn test_result_name_empty_when_unknown() {
        let context = BuildContext::new("demo", 1);
        assert_eq!(context.result_name(), "");
        assert_eq!(
            context.with_result(BuildResult::Failure).result_name(),
            "FAILURE"
        );
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "job_name": "demo",
                "build_number": 42,
                "result": "UNSTABLE",
                "environment": [{{"NODE_NAME": "agent-1"}}],
                "change_authors": ["alice"],
                "history": [{{"number": 41, "result": "FAILURE", "authors": ["bob"]}}]
            }}"#
        )
        .unwrap();

        let context = BuildContext::from_json_file(file.path()).unwrap();
        assert_eq!(context.build_number, 42);
        assert_eq!(context.result, Some(BuildResult::Unstable));
        assert_eq!(context.environment[0]["NODE_NAME"], "agent-1");
        assert_eq!(context.culprits(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = BuildContext::from_json_file(Path::new("/nonexistent/context.json"));
        assert!(err.is_err());
    }
}
