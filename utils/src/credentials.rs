use bon::Builder;
use clap::Args;

use crate::{
    constants::{DOCKER_BUILDER_PASSWORD, DOCKER_BUILDER_USER},
    secret::SecretValue,
};

/// The credentials used for logging into image registries
/// and handed to the build script.
#[derive(Debug, Clone, Builder)]
pub struct Credentials {
    #[builder(into)]
    pub username: String,

    #[builder(into)]
    pub password: SecretValue,
}

#[derive(Debug, Default, Clone, Builder, Args)]
pub struct CredentialsArgs {
    /// The username to login to the
    /// container registry.
    #[arg(short = 'U', long, env = DOCKER_BUILDER_USER, hide_env_values = true)]
    #[builder(into)]
    pub username: Option<String>,

    /// The password to login to the
    /// container registry.
    #[arg(short = 'P', long, env = DOCKER_BUILDER_PASSWORD, hide_env_values = true)]
    #[builder(into)]
    pub password: Option<SecretValue>,
}

impl CredentialsArgs {
    /// The username, if it was given and isn't blank.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|username| !username.is_empty())
    }

    /// The password, if it was given and isn't blank.
    #[must_use]
    pub fn password(&self) -> Option<SecretValue> {
        self.password
            .clone()
            .filter(|password| !password.is_empty())
    }

    /// Builds the credentials when both parts are present.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Some(
            Credentials::builder()
                .username(self.username()?)
                .password(self.password()?)
                .build(),
        )
    }
}
