//! Fixed backlog used until a real tracker is wired in.

use super::{IssueError, IssueRecord, IssueSource};

/// Returns the same two tickets for every project id. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockIssueSource;

#[async_trait::async_trait]
impl IssueSource for MockIssueSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_issues(&self, _project_id: &str) -> Result<Vec<IssueRecord>, IssueError> {
        Ok(fixed_backlog())
    }
}

fn fixed_backlog() -> Vec<IssueRecord> {
    vec![
        IssueRecord {
            id: "10001".into(),
            key: "PROJ-101".into(),
            summary: "As a PM, I want automated project health reports.".into(),
            status: "In Progress".into(),
            assignee: "Alice Johnson".into(),
            description: None,
        },
        IssueRecord {
            id: "10002".into(),
            key: "PROJ-102".into(),
            summary: "As a developer, I want risk alerts for delayed stories.".into(),
            status: "Open".into(),
            assignee: "Bob Smith".into(),
            description: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_fixed_non_empty_backlog() {
        let issues = MockIssueSource.get_issues("P1").await.unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].key, "PROJ-101");
        assert_eq!(issues[1].assignee, "Bob Smith");
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let first = MockIssueSource.get_issues("P1").await.unwrap();
        let second = MockIssueSource.get_issues("P1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn ignores_project_id() {
        let a = MockIssueSource.get_issues("P1").await.unwrap();
        let b = MockIssueSource.get_issues("").await.unwrap();
        assert_eq!(a, b);
    }
}
