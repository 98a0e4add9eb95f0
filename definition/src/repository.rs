use std::{fmt::Display, str::FromStr};

use lazy_regex::regex_captures;

use crate::RepositoryUrlError;

/// The `owner/repo` pair taken from a git remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName {
    pub owner: String,
    pub repo: String,
}

impl RepositoryName {
    /// The last path segment, used as the clone directory name.
    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for RepositoryName {
    type Err = RepositoryUrlError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let url = url.trim();
        let err = || RepositoryUrlError {
            url: url.to_string(),
        };

        let path = regex_captures!(r"^[^@\s/]+@[^:\s/]+:([^\s]+?)(?:\.git)?/?$", url)
            .or_else(|| regex_captures!(r"^https?://[^/\s]+/([^\s]+?)(?:\.git)?/?$", url))
            .map(|(_, path)| path)
            .ok_or_else(err)?;

        let (owner, repo) = path.rsplit_once('/').ok_or_else(err)?;

        if owner.is_empty() || repo.is_empty() {
            return Err(err());
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl Display for RepositoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::RepositoryName;

    #[rstest]
    #[case::ssh("git@github.com:foo/bar.git", "foo", "bar")]
    #[case::ssh_no_suffix("git@github.com:foo/bar", "foo", "bar")]
    #[case::https("https://github.com/foo/bar.git", "foo", "bar")]
    #[case::https_no_suffix("https://github.com/foo/bar", "foo", "bar")]
    #[case::http_trailing_slash("http://git.example.com/foo/bar/", "foo", "bar")]
    #[case::nested_group("git@gitlab.com:group/sub/bar.git", "group/sub", "bar")]
    #[case::dotted_repo("https://github.com/foo/bar.baz.git", "foo", "bar.baz")]
    #[case::whitespace("  git@github.com:foo/bar.git\n", "foo", "bar")]
    fn parses_remote_urls(#[case] url: &str, #[case] owner: &str, #[case] repo: &str) {
        let name: RepositoryName = url.parse().unwrap();

        assert_eq!(name.owner, owner);
        assert_eq!(name.repo(), repo);
    }

    #[rstest]
    #[case::empty("")]
    #[case::bare_name("bar")]
    #[case::no_owner("git@github.com:bar.git")]
    #[case::file_url("file:///srv/git/foo/bar.git")]
    #[case::https_no_path("https://github.com/")]
    #[case::spaces("git@github.com:foo bar/baz.git")]
    fn rejects_unrecognized_urls(#[case] url: &str) {
        let err = url.parse::<RepositoryName>().unwrap_err();

        assert_eq!(err.url, url.trim());
    }

    #[test]
    fn displays_owner_and_repo() {
        let name: RepositoryName = "git@github.com:foo/bar.git".parse().unwrap();

        assert_eq!(name.to_string(), "foo/bar");
    }
}
