//! The `container-deploy` library used for the CLI.
//!
//! A run validates every container definition and CI value up front,
//! then builds, publishes, and syncs the defaults of each container.

pub mod commands;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test {
    use std::{fs, path::Path};

    use container_deploy_process_management::drivers::types::{CiContext, CiDriverType, CiValue};
    use container_deploy_utils::{
        constants::{
            DEPLOY_BUILD_NUMBER, DEPLOY_EVENT_TYPE, DEPLOY_PULL_REQUEST_BRANCH, PR_EVENT,
        },
        credentials::CredentialsArgs,
    };
    use tempfile::TempDir;

    use crate::pipeline::config::DeployRequest;

    const WEB_METADATA: &str = r#"#!/bin/sh
export DOCKER_REGISTRY_HOST="registry.example.com"
export DOCKER_REPOSITORY="org/web"
export DOCKER_MINOR_VERSION="1.4"
"#;

    const API_METADATA: &str = r#"export DOCKER_REGISTRY_HOST="registry.example.com"
export DOCKER_REPOSITORY="org/api"
export DOCKER_MINOR_VERSION="2.0"
"#;

    /// A nested definitions directory with `api` and `web`, where
    /// only `web` has defaults, plus an executable build script.
    pub fn fixture() -> TempDir {
        let root = TempDir::new().unwrap();
        let path = root.path();

        fs::create_dir_all(path.join("api")).unwrap();
        fs::write(path.join("api/docker_metadata.sh"), API_METADATA).unwrap();
        fs::write(path.join("api/packer.json"), "{}\n").unwrap();

        fs::create_dir_all(path.join("web/defaults/conf.d")).unwrap();
        fs::write(path.join("web/docker_metadata.sh"), WEB_METADATA).unwrap();
        fs::write(path.join("web/packer.json"), "{}\n").unwrap();
        fs::write(path.join("web/defaults/conf.d/app.conf"), "port=80\n").unwrap();

        let script = path.join("build.sh");
        fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        }

        root
    }

    pub fn ci_context(event: Option<&str>, branch: Option<&str>, build: Option<&str>) -> CiContext {
        CiContext::builder()
            .driver(CiDriverType::Local)
            .event_type(CiValue::new(DEPLOY_EVENT_TYPE, event.map(String::from)))
            .pull_request_event(PR_EVENT)
            .pull_request_branch(CiValue::new(
                DEPLOY_PULL_REQUEST_BRANCH,
                branch.map(String::from),
            ))
            .build_number(CiValue::new(DEPLOY_BUILD_NUMBER, build.map(String::from)))
            .build()
    }

    pub fn push_context() -> CiContext {
        ci_context(Some("push"), None, Some("57"))
    }

    pub fn pr_context() -> CiContext {
        ci_context(Some(PR_EVENT), Some("feature/x"), None)
    }

    pub const fn no_tools(_: &'static str) -> bool {
        false
    }

    pub fn deploy_request(root: &Path, ci: CiContext) -> DeployRequest {
        DeployRequest::builder()
            .containers_dir(root)
            .build_script("build.sh")
            .credentials(
                CredentialsArgs::builder()
                    .username("bot")
                    .password("s3cret")
                    .build(),
            )
            .ci(ci)
            .registry_tool("docker")
            .tool_check(|_| true)
            .build()
    }
}
