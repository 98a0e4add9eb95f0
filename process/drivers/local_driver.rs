use container_deploy_utils::constants::{
    DEPLOY_BUILD_NUMBER, DEPLOY_EVENT_TYPE, DEPLOY_PULL_REQUEST_BRANCH, PR_EVENT,
};

use super::{types::CiDriverType, CiDriver};

/// Reads the event from `DEPLOY_*` variables for runs outside
/// of a recognized CI system.
pub struct LocalDriver;

impl CiDriver for LocalDriver {
    const DRIVER: CiDriverType = CiDriverType::Local;
    const EVENT_TYPE: &'static str = DEPLOY_EVENT_TYPE;
    const PULL_REQUEST_EVENT: &'static str = PR_EVENT;
    const PULL_REQUEST_BRANCH: &'static str = DEPLOY_PULL_REQUEST_BRANCH;
    const BUILD_NUMBER: &'static str = DEPLOY_BUILD_NUMBER;
}

#[cfg(test)]
mod test {
    use container_deploy_utils::{
        constants::{DEPLOY_BUILD_NUMBER, DEPLOY_EVENT_TYPE, DEPLOY_PULL_REQUEST_BRANCH},
        test_utils::unset_env_var,
    };
    use pretty_assertions::assert_eq;

    use crate::drivers::CiDriver;

    use super::LocalDriver;

    #[test]
    fn missing_values_keep_their_names() {
        unset_env_var(DEPLOY_EVENT_TYPE);
        unset_env_var(DEPLOY_PULL_REQUEST_BRANCH);
        unset_env_var(DEPLOY_BUILD_NUMBER);

        let context = LocalDriver::context();

        assert_eq!(context.is_pull_request(), None);
        assert_eq!(context.event_type.var, DEPLOY_EVENT_TYPE);
        assert_eq!(context.build_number.var, DEPLOY_BUILD_NUMBER);
    }
}
