use super::{BuildResult, BuildSummary};

/// Users responsible for the current state of the job.
///
/// Starts with the authors of the current build's changes, then walks
/// `history` (most recent first) while each prior build is worse than
/// `SUCCESS`. The walk stops at the first successful build, at a build with
/// no recorded result, or when history runs out. Names keep first-seen order
/// and appear once.
pub fn responsible_parties<'a>(
    current_authors: &'a [String],
    history: &'a [BuildSummary],
) -> Vec<&'a str> {
    let unhealthy = history
        .iter()
        .take_while(|build| {
            build
                .result
                .is_some_and(|result| result.is_worse_than(BuildResult::Success))
        })
        .flat_map(|build| build.authors.iter());

    let mut culprits: Vec<&str> = Vec::new();
    for author in current_authors.iter().chain(unhealthy) {
        if !culprits.contains(&author.as_str()) {
            culprits.push(author);
        }
    }
    culprits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(number: u64, result: Option<BuildResult>, authors: &[&str]) -> BuildSummary {
        BuildSummary {
            number,
            result,
            authors: authors.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_no_changes_no_culprits() {
        assert!(responsible_parties(&[], &[]).is_empty());
    }

    #[test]
    fn test_stops_at_first_successful_build() {
        let current = vec!["alice".to_string()];
        let history = vec![
            build(9, Some(BuildResult::Failure), &["bob"]),
            build(8, Some(BuildResult::Unstable), &["carol"]),
            build(7, Some(BuildResult::Success), &["dave"]),
            build(6, Some(BuildResult::Failure), &["erin"]),
        ];

        assert_eq!(
            responsible_parties(&current, &history),
            vec!["alice", "bob", "carol"]
        );
    }

    #[test]
    fn test_previous_success_limits_to_current_authors() {
        let current = vec!["alice".to_string(), "bob".to_string()];
        let history = vec![build(4, Some(BuildResult::Success), &["carol"])];
        assert_eq!(responsible_parties(&current, &history), vec!["alice", "bob"]);
    }

    #[test]
    fn test_build_without_result_stops_walk() {
        let history = vec![
            build(3, None, &["bob"]),
            build(2, Some(BuildResult::Failure), &["carol"]),
        ];
        assert!(responsible_parties(&[], &history).is_empty());
    }

    #[test]
    fn test_exhausted_history_and_deduplication() {
        let current = vec!["alice".to_string()];
        let history = vec![
            build(2, Some(BuildResult::Failure), &["bob", "alice"]),
            build(1, Some(BuildResult::Aborted), &["bob"]),
        ];
        assert_eq!(responsible_parties(&current, &history), vec!["alice", "bob"]);
    }
}
