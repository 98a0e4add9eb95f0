// Paths
pub const BUILD_SCRIPT: &str = "build.sh";
pub const CONTAINERS_PATH: &str = "./docker";
pub const DEFAULTS_PATH: &str = "defaults";
pub const DESCRIPTOR_EXTENSION: &str = "json";
pub const LOG_DIR: &str = ".cache/container-deploy";
pub const METADATA_FILE: &str = "docker_metadata.sh";
pub const NESTED_DESCRIPTOR_FILE: &str = "packer.json";

// Metadata keys
pub const DOCKER_MINOR_VERSION: &str = "DOCKER_MINOR_VERSION";
pub const DOCKER_REGISTRY_HOST: &str = "DOCKER_REGISTRY_HOST";
pub const DOCKER_REPOSITORY: &str = "DOCKER_REPOSITORY";
pub const DOCKER_REPOSITORY_PREFIX: &str = "DOCKER_REPOSITORY_PREFIX";

// Deploy vars
pub const CONTAINER: &str = "CONTAINER";
pub const DEFAULTS_BRANCH: &str = "DEFAULTS_BRANCH";
pub const DEFAULTS_DIR: &str = "DEFAULTS_DIR";
pub const DEFAULTS_LABEL: &str = "DEFAULTS_LABEL";
pub const DEFAULTS_REPOSITORY: &str = "DEFAULTS_REPOSITORY";
pub const DEPLOY_BUILD_NUMBER: &str = "DEPLOY_BUILD_NUMBER";
pub const DEPLOY_BUILD_SCRIPT: &str = "DEPLOY_BUILD_SCRIPT";
pub const DEPLOY_CI_DRIVER: &str = "DEPLOY_CI_DRIVER";
pub const DEPLOY_COMMAND_TIMEOUT: &str = "DEPLOY_COMMAND_TIMEOUT";
pub const DEPLOY_CONTAINERS_DIR: &str = "DEPLOY_CONTAINERS_DIR";
pub const DEPLOY_EVENT_TYPE: &str = "DEPLOY_EVENT_TYPE";
pub const DEPLOY_FAIL_FAST: &str = "DEPLOY_FAIL_FAST";
pub const DEPLOY_PULL_REQUEST_BRANCH: &str = "DEPLOY_PULL_REQUEST_BRANCH";
pub const DEPLOY_REGISTRY_DRIVER: &str = "DEPLOY_REGISTRY_DRIVER";
pub const DOCKER_BUILDER_PASSWORD: &str = "DOCKER_BUILDER_PASSWORD";
pub const DOCKER_BUILDER_USER: &str = "DOCKER_BUILDER_USER";
pub const DOCKER_TAG: &str = "DOCKER_TAG";

// Travis CI vars
pub const TRAVIS: &str = "TRAVIS";
pub const TRAVIS_BUILD_NUMBER: &str = "TRAVIS_BUILD_NUMBER";
pub const TRAVIS_EVENT_TYPE: &str = "TRAVIS_EVENT_TYPE";
pub const TRAVIS_PULL_REQUEST_BRANCH: &str = "TRAVIS_PULL_REQUEST_BRANCH";

// GitHub CI vars
pub const GITHUB_ACTIONS: &str = "GITHUB_ACTIONS";
pub const GITHUB_EVENT_NAME: &str = "GITHUB_EVENT_NAME";
pub const GITHUB_HEAD_REF: &str = "GITHUB_HEAD_REF";
pub const GITHUB_RUN_NUMBER: &str = "GITHUB_RUN_NUMBER";

// GitLab CI vars
pub const CI_MERGE_REQUEST_SOURCE_BRANCH_NAME: &str = "CI_MERGE_REQUEST_SOURCE_BRANCH_NAME";
pub const CI_PIPELINE_IID: &str = "CI_PIPELINE_IID";
pub const CI_PIPELINE_SOURCE: &str = "CI_PIPELINE_SOURCE";
pub const GITLAB_CI: &str = "GITLAB_CI";

// Events
pub const GITLAB_MR_EVENT: &str = "merge_request_event";
pub const PR_EVENT: &str = "pull_request";

// Misc
pub const DEFAULT_BRANCH: &str = "master";
pub const GIT_REMOTE: &str = "origin";
pub const LATEST_TAG: &str = "latest";
