use std::path::Path;

use bon::Builder;
use container_deploy_utils::credentials::Credentials;

/// Options for running the external build script.
///
/// The script is invoked as
/// `<script> -t <tag> -u <user> -p <password> [args...] <container>`
/// from `working_dir`.
#[derive(Debug, Clone, Builder)]
pub struct BuildScriptOpts<'scope> {
    pub script: &'scope Path,
    pub working_dir: &'scope Path,
    pub container: &'scope str,
    pub tag: &'scope str,
    pub credentials: &'scope Credentials,

    #[builder(default)]
    pub args: &'scope [String],
}
