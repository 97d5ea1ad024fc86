//! Release notes rendering

use tracing::{debug, instrument};

use shipyard_core::config::ReleaseOptions;
use shipyard_core::labels::{ReleaseType, VersionLabelMap};
use shipyard_core::types::{BumpType, Commit};

/// Groups commits into headed sections and renders markdown
pub struct ReleaseNotesRenderer {
    version_map: VersionLabelMap,
    sections: Vec<(String, String)>,
    other_heading: String,
}

impl ReleaseNotesRenderer {
    /// Create a renderer for the given options
    pub fn new(options: &ReleaseOptions) -> Self {
        Self {
            version_map: options.version_map(),
            sections: options
                .sections
                .iter()
                .map(|s| (s.keyword.clone(), s.title.clone()))
                .collect(),
            other_heading: options.other_heading.clone(),
        }
    }

    /// Section keyword a pull request commit belongs to; `None` means the
    /// "other" section
    fn section_for(&self, commit: &Commit) -> Option<&str> {
        let recognised = self.version_map.recognised(&commit.labels);

        if let Some(bump) = self.version_map.bump_for(&commit.labels) {
            return self.configured(bump.as_str());
        }

        if recognised.is_empty() {
            return self.configured(BumpType::Patch.as_str());
        }

        recognised
            .into_iter()
            .map(ReleaseType::as_str)
            .find_map(|keyword| self.configured(keyword))
    }

    fn configured(&self, keyword: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(k, _)| k.as_str())
    }

    /// Render notes. Commits with neither a pull request nor labels come
    /// first as a bare list, then each non-empty section in configured
    /// order, then "other".
    #[instrument(skip(self, commits), fields(commit_count = commits.len()))]
    pub fn render(&self, commits: &[Commit]) -> String {
        let mut bare = Vec::new();
        let mut grouped: Vec<Vec<String>> = vec![Vec::new(); self.sections.len()];
        let mut other = Vec::new();

        for commit in commits {
            if commit.pull_request.is_none() && commit.labels.is_empty() {
                bare.push(format!("- {}", commit.title()));
                continue;
            }

            let line = render_line(commit);
            match self.section_for(commit) {
                Some(keyword) => {
                    let index = self
                        .sections
                        .iter()
                        .position(|(k, _)| k == keyword)
                        .unwrap_or_default();
                    grouped[index].push(line);
                }
                None => other.push(line),
            }
        }

        let mut blocks = Vec::new();
        if !bare.is_empty() {
            blocks.push(bare.join("\n"));
        }

        let headed = self
            .sections
            .iter()
            .map(|(_, title)| title.as_str())
            .zip(grouped)
            .chain(std::iter::once((self.other_heading.as_str(), other)));

        for (title, lines) in headed {
            if !lines.is_empty() {
                blocks.push(format!("#### {}\n\n{}", title, lines.join("\n")));
            }
        }

        debug!(blocks = blocks.len(), "rendered release notes");
        blocks.join("\n\n")
    }
}

/// One note line: `- subject (#N) @author, Name`
fn render_line(commit: &Commit) -> String {
    let mut line = format!("- {}", commit.title());

    if let Some(number) = commit.pr_number() {
        line.push_str(&format!(" (#{})", number));
    }

    let mut authors: Vec<String> = Vec::new();
    for author in commit.authors.iter().filter_map(|a| a.display()) {
        if !authors.contains(&author) {
            authors.push(author);
        }
    }
    if !authors.is_empty() {
        line.push(' ');
        line.push_str(&authors.join(", "));
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shipyard_core::config::SectionHeading;
    use shipyard_core::labels::LabelDefinition;
    use shipyard_core::types::{Author, PullRequestRef};

    fn commit(subject: &str, pr: Option<u64>, labels: &[&str]) -> Commit {
        let mut commit = Commit::new("abc", subject, "Adam Dierkens", "adam@dierkens.com", Utc::now())
            .with_labels(labels.iter().copied());
        commit.pull_request = pr.map(PullRequestRef::new);
        commit
    }

    #[test]
    fn test_empty_notes() {
        let renderer = ReleaseNotesRenderer::new(&ReleaseOptions::default());
        assert_eq!(renderer.render(&[]), "");
    }

    #[test]
    fn test_sections_in_order() {
        let renderer = ReleaseNotesRenderer::new(&ReleaseOptions::default());
        let mut resolved = commit("Add widget", Some(2), &["minor"]);
        resolved.authors = vec![
            Author::from_username("adierkens"),
            Author::from_git("Andrew", "andrew@example.com"),
        ];

        let notes = renderer.render(&[
            commit("Fix typo", Some(1), &[]),
            resolved,
            commit("Drop node 10", Some(3), &["major", "patch"]),
            commit("Update docs", Some(4), &["documentation"]),
            commit("Straight to main\nwith details", None, &[]),
        ]);

        assert_eq!(
            notes,
            "- Straight to main\n\n\
             #### Breaking Changes\n\n- Drop node 10 (#3) Adam Dierkens\n\n\
             #### Features\n\n- Add widget (#2) @adierkens, Andrew\n\n\
             #### Fixes\n\n- Fix typo (#1) Adam Dierkens\n\n\
             #### Other\n\n- Update docs (#4) Adam Dierkens"
        );
    }

    #[test]
    fn test_configured_section_for_none_labels() {
        let mut options = ReleaseOptions {
            labels: vec![LabelDefinition::new("deploy", "", "deploy")],
            ..Default::default()
        };
        options.sections.push(SectionHeading::new("none", "Internal"));
        options.sections.push(SectionHeading::new("deploy", "Deployments"));
        let renderer = ReleaseNotesRenderer::new(&options);

        let notes = renderer.render(&[
            commit("Refactor", Some(1), &["internal"]),
            commit("Ship it", Some(2), &["deploy"]),
            commit("Just release", Some(3), &["release"]),
        ]);

        assert!(notes.contains("#### Internal\n\n- Refactor (#1)"));
        assert!(notes.contains("#### Deployments\n\n- Ship it (#2)"));
        assert!(notes.ends_with("#### Other\n\n- Just release (#3) Adam Dierkens"));
    }

    #[test]
    fn test_commit_without_authors() {
        let renderer = ReleaseNotesRenderer::new(&ReleaseOptions::default());
        let mut c = commit("Quiet change", Some(9), &["patch"]);
        c.authors.clear();

        assert_eq!(renderer.render(&[c]), "#### Fixes\n\n- Quiet change (#9)");
    }

    #[test]
    fn test_labelled_commit_without_pull_request_is_sectioned() {
        let renderer = ReleaseNotesRenderer::new(&ReleaseOptions::default());

        let notes = renderer.render(&[
            commit("Found by hash\nbody", None, &["major"]),
            commit("Plain push", None, &[]),
        ]);

        assert_eq!(
            notes,
            "- Plain push\n\n#### Breaking Changes\n\n- Found by hash Adam Dierkens"
        );
    }
}
