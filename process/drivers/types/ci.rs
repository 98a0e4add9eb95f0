use bon::Builder;

use super::CiDriverType;

/// A value read from the CI environment along with the variable it
/// came from, so a missing value can be reported by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiValue {
    pub var: &'static str,
    pub value: Option<String>,
}

impl CiValue {
    #[must_use]
    pub const fn new(var: &'static str, value: Option<String>) -> Self {
        Self { var, value }
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Replace the value when an override is given.
    #[must_use]
    pub fn or_override(self, value: Option<String>) -> Self {
        Self {
            value: value
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .or(self.value),
            ..self
        }
    }
}

/// Everything the pipeline needs to know about the CI event that
/// triggered it. Read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct CiContext {
    pub driver: CiDriverType,
    pub event_type: CiValue,

    /// The event type value this CI system uses for pull requests.
    pub pull_request_event: &'static str,

    pub pull_request_branch: CiValue,
    pub build_number: CiValue,
}

impl CiContext {
    /// `None` when the event type itself is unknown.
    #[must_use]
    pub fn is_pull_request(&self) -> Option<bool> {
        self.event_type
            .value()
            .map(|event| event == self.pull_request_event)
    }

    /// Apply values given on the command line over the ones read
    /// from the environment.
    #[must_use]
    pub fn with_overrides(
        self,
        event_type: Option<String>,
        pull_request_branch: Option<String>,
        build_number: Option<String>,
    ) -> Self {
        Self {
            event_type: self.event_type.or_override(event_type),
            pull_request_branch: self.pull_request_branch.or_override(pull_request_branch),
            build_number: self.build_number.or_override(build_number),
            ..self
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::drivers::types::CiDriverType;

    use super::{CiContext, CiValue};

    fn context(event: Option<&str>) -> CiContext {
        CiContext::builder()
            .driver(CiDriverType::Local)
            .event_type(CiValue::new("EVENT", event.map(String::from)))
            .pull_request_event("pull_request")
            .pull_request_branch(CiValue::new("BRANCH", None))
            .build_number(CiValue::new("BUILD", Some("7".into())))
            .build()
    }

    #[test]
    fn pull_request_detection() {
        assert_eq!(context(Some("pull_request")).is_pull_request(), Some(true));
        assert_eq!(context(Some("push")).is_pull_request(), Some(false));
        assert_eq!(context(None).is_pull_request(), None);
    }

    #[test]
    fn overrides_replace_values() {
        let context = context(Some("push")).with_overrides(
            Some("pull_request".into()),
            Some("feature/x".into()),
            Some("  ".into()),
        );

        assert_eq!(context.event_type.value(), Some("pull_request"));
        assert_eq!(context.pull_request_branch.value(), Some("feature/x"));
        assert_eq!(context.build_number.value(), Some("7"));
        assert_eq!(context.build_number.var, "BUILD");
    }
}
