use container_deploy_utils::constants::{
    CI_MERGE_REQUEST_SOURCE_BRANCH_NAME, CI_PIPELINE_IID, CI_PIPELINE_SOURCE, GITLAB_MR_EVENT,
};

use super::{types::CiDriverType, CiDriver};

pub struct GitlabDriver;

impl CiDriver for GitlabDriver {
    const DRIVER: CiDriverType = CiDriverType::Gitlab;
    const EVENT_TYPE: &'static str = CI_PIPELINE_SOURCE;
    const PULL_REQUEST_EVENT: &'static str = GITLAB_MR_EVENT;
    const PULL_REQUEST_BRANCH: &'static str = CI_MERGE_REQUEST_SOURCE_BRANCH_NAME;
    const BUILD_NUMBER: &'static str = CI_PIPELINE_IID;
}

#[cfg(test)]
mod test {
    use container_deploy_utils::{
        constants::{CI_MERGE_REQUEST_SOURCE_BRANCH_NAME, CI_PIPELINE_IID, CI_PIPELINE_SOURCE},
        test_utils::set_env_var,
    };
    use pretty_assertions::assert_eq;

    use crate::drivers::CiDriver;

    use super::GitlabDriver;

    #[test]
    fn merge_request_is_a_pull_request() {
        set_env_var(CI_PIPELINE_SOURCE, "merge_request_event");
        set_env_var(CI_MERGE_REQUEST_SOURCE_BRANCH_NAME, "fix/thing");
        set_env_var(CI_PIPELINE_IID, "301");

        let context = GitlabDriver::context();

        assert_eq!(context.is_pull_request(), Some(true));
        assert_eq!(context.pull_request_branch.value(), Some("fix/thing"));
    }

    #[test]
    fn push_pipeline_is_not() {
        set_env_var(CI_PIPELINE_SOURCE, "push");
        set_env_var(CI_PIPELINE_IID, "301");

        let context = GitlabDriver::context();

        assert_eq!(context.is_pull_request(), Some(false));
        assert_eq!(context.build_number.value(), Some("301"));
    }
}
