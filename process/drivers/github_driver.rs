use container_deploy_utils::constants::{
    GITHUB_EVENT_NAME, GITHUB_HEAD_REF, GITHUB_RUN_NUMBER, PR_EVENT,
};

use super::{types::CiDriverType, CiDriver};

pub struct GithubDriver;

impl CiDriver for GithubDriver {
    const DRIVER: CiDriverType = CiDriverType::Github;
    const EVENT_TYPE: &'static str = GITHUB_EVENT_NAME;
    const PULL_REQUEST_EVENT: &'static str = PR_EVENT;
    const PULL_REQUEST_BRANCH: &'static str = GITHUB_HEAD_REF;
    const BUILD_NUMBER: &'static str = GITHUB_RUN_NUMBER;
}

#[cfg(test)]
mod test {
    use container_deploy_utils::{
        constants::{GITHUB_EVENT_NAME, GITHUB_HEAD_REF, GITHUB_RUN_NUMBER},
        test_utils::{set_env_var, unset_env_var},
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::drivers::{types::CiDriverType, CiDriver};

    use super::GithubDriver;

    #[rstest]
    #[case::push("push", None, Some(false))]
    #[case::pull_request("pull_request", Some("feature/x"), Some(true))]
    #[case::schedule("schedule", None, Some(false))]
    fn reads_event(
        #[case] event: &str,
        #[case] head_ref: Option<&str>,
        #[case] expected: Option<bool>,
    ) {
        set_env_var(GITHUB_EVENT_NAME, event);
        set_env_var(GITHUB_RUN_NUMBER, "12");
        match head_ref {
            Some(head_ref) => set_env_var(GITHUB_HEAD_REF, head_ref),
            None => unset_env_var(GITHUB_HEAD_REF),
        }

        let context = GithubDriver::context();

        assert_eq!(context.driver, CiDriverType::Github);
        assert_eq!(context.is_pull_request(), expected);
        assert_eq!(context.pull_request_branch.value(), head_ref);
        assert_eq!(context.build_number.value(), Some("12"));
    }
}
