use std::{fmt::Display, str::FromStr};

use lazy_regex::regex_is_match;

use crate::{Metadata, TagError, VersionTagError};

/// How the version tag of a run is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagType {
    /// Rebuild of a pull request's source branch.
    PullRequest { branch: String },

    /// Mainline build, appending the CI build number to the
    /// container's minor version.
    IncrementPatch { build_number: String },
}

impl TagType {
    /// Compute the tag a container is published under.
    ///
    /// # Errors
    /// Will error if the container's minor version is missing or the
    /// resulting tag is not a valid image tag.
    pub fn version_tag(&self, metadata: &Metadata) -> Result<VersionTag, TagError> {
        Ok(match self {
            Self::PullRequest { branch } => VersionTag::from_branch(branch)?,
            Self::IncrementPatch { build_number } => {
                VersionTag::from_version(metadata.minor_version()?, build_number)?
            }
        })
    }

    /// Only mainline builds move the `latest` alias.
    #[must_use]
    pub const fn pushes_latest(&self) -> bool {
        matches!(self, Self::IncrementPatch { .. })
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::PullRequest { branch } => format!("pull request build of branch {branch}"),
            Self::IncrementPatch { build_number } => {
                format!("patch increment for build number {build_number}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTag(String);

impl VersionTag {
    /// Branch names become tags by replacing every `/` with `-`.
    ///
    /// # Errors
    /// Will error if the result is not a valid image tag.
    pub fn from_branch(branch: &str) -> Result<Self, VersionTagError> {
        branch.trim().replace('/', "-").parse()
    }

    /// # Errors
    /// Will error if the result is not a valid image tag.
    pub fn from_version(minor_version: &str, build_number: &str) -> Result<Self, VersionTagError> {
        format!("{}.{}", minor_version.trim(), build_number.trim()).parse()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for VersionTag {
    type Err = VersionTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            Err(VersionTagError::Empty)
        } else if regex_is_match!(r"^[\w][\w.-]{0,127}$", s) {
            Ok(Self(s.into()))
        } else {
            Err(VersionTagError::Invalid { tag: s.into() })
        }
    }
}

impl Display for VersionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<VersionTag> for String {
    fn from(value: VersionTag) -> Self {
        value.0
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Metadata, TagError, VersionTagError};

    use super::{TagType, VersionTag};

    #[test]
    fn pull_request_uses_branch() {
        let tag_type = TagType::PullRequest {
            branch: "feature/x".into(),
        };

        let tag = tag_type.version_tag(&Metadata::default()).unwrap();

        assert_eq!(tag.as_str(), "feature-x");
        assert!(!tag_type.pushes_latest());
    }

    #[test]
    fn increment_patch_appends_build_number() {
        let tag_type = TagType::IncrementPatch {
            build_number: "57".into(),
        };
        let metadata = Metadata::parse("export DOCKER_MINOR_VERSION=\"2.3\"");

        let tag = tag_type.version_tag(&metadata).unwrap();

        assert_eq!(tag.as_str(), "2.3.57");
        assert!(tag_type.pushes_latest());
    }

    #[test]
    fn increment_patch_requires_minor_version() {
        let tag_type = TagType::IncrementPatch {
            build_number: "57".into(),
        };

        let err = tag_type.version_tag(&Metadata::default()).unwrap_err();

        assert!(matches!(err, TagError::Metadata(_)));
    }

    #[test]
    fn resolution_is_deterministic() {
        let tag_type = TagType::PullRequest {
            branch: "fix/a/b".into(),
        };

        assert_eq!(
            tag_type.version_tag(&Metadata::default()).unwrap(),
            tag_type.version_tag(&Metadata::default()).unwrap()
        );
    }

    #[rstest]
    #[case("main", "main")]
    #[case("feature/x", "feature-x")]
    #[case("user/fix/nested", "user-fix-nested")]
    #[case("release-1.2", "release-1.2")]
    fn branch_tags(#[case] branch: &str, #[case] expected: &str) {
        assert_eq!(VersionTag::from_branch(branch).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case::empty("", VersionTagError::Empty)]
    #[case::leading_dash("-x", VersionTagError::Invalid { tag: "-x".into() })]
    #[case::space("a b", VersionTagError::Invalid { tag: "a b".into() })]
    #[case::colon("a:b", VersionTagError::Invalid { tag: "a:b".into() })]
    fn rejects_invalid_tags(#[case] tag: &str, #[case] expected: VersionTagError) {
        assert_eq!(tag.parse::<VersionTag>().unwrap_err(), expected);
    }

    #[test]
    fn rejects_long_tags() {
        let tag = "a".repeat(129);

        assert!(tag.parse::<VersionTag>().is_err());
        assert!(tag[..128].parse::<VersionTag>().is_ok());
    }
}
