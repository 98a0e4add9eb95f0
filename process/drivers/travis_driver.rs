use container_deploy_utils::constants::{
    PR_EVENT, TRAVIS_BUILD_NUMBER, TRAVIS_EVENT_TYPE, TRAVIS_PULL_REQUEST_BRANCH,
};

use super::{types::CiDriverType, CiDriver};

pub struct TravisDriver;

impl CiDriver for TravisDriver {
    const DRIVER: CiDriverType = CiDriverType::Travis;
    const EVENT_TYPE: &'static str = TRAVIS_EVENT_TYPE;
    const PULL_REQUEST_EVENT: &'static str = PR_EVENT;
    const PULL_REQUEST_BRANCH: &'static str = TRAVIS_PULL_REQUEST_BRANCH;
    const BUILD_NUMBER: &'static str = TRAVIS_BUILD_NUMBER;
}
