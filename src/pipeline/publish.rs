use std::collections::HashSet;

use colored::Colorize;
use container_deploy_process_management::drivers::{
    opts::{LoginOpts, PushOpts, TagOpts},
    RegistryDriver,
};
use container_deploy_utils::credentials::Credentials;
use log::{debug, info, trace};
use miette::{Result, WrapErr};
use oci_distribution::Reference;

use super::config::ContainerPlan;

/// The references a container was published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub image: Reference,
    pub latest: Option<Reference>,
}

/// Pushes built images, logging into each registry the first time
/// it is used.
pub struct ImagePublisher<'a, D> {
    driver: &'a D,
    credentials: &'a Credentials,
    logged_in: HashSet<String>,
}

impl<'a, D: RegistryDriver> ImagePublisher<'a, D> {
    pub fn new(driver: &'a D, credentials: &'a Credentials) -> Self {
        Self {
            driver,
            credentials,
            logged_in: HashSet::new(),
        }
    }

    fn login(&mut self, registry: &str) -> Result<()> {
        if self.logged_in.contains(registry) {
            debug!("Already logged into {registry}");
            return Ok(());
        }

        self.driver
            .login(
                &LoginOpts::builder()
                    .registry(registry)
                    .credentials(self.credentials)
                    .build(),
            )
            .wrap_err_with(|| format!("Failed to login to {registry}"))?;
        self.logged_in.insert(registry.to_string());
        Ok(())
    }

    /// Push the versioned image, then move `latest` onto it when the
    /// plan asks for it.
    ///
    /// # Errors
    /// Will error if login or either push fails. A failure after the
    /// versioned push leaves `latest` pointing at an older image.
    pub fn publish(&mut self, plan: &ContainerPlan) -> Result<PublishResult> {
        trace!("ImagePublisher::publish({})", plan.name());

        self.login(&plan.registry)?;

        info!("Pushing {}", plan.image.to_string().bold());
        self.driver
            .push(&PushOpts::builder().image(&plan.image).build())
            .wrap_err_with(|| format!("Failed to push {}", plan.image))?;

        if let Some(latest) = &plan.latest {
            self.push_latest(&plan.image, latest).wrap_err_with(|| {
                format!(
                    "Pushed {} but the latest alias is stale, {latest} still points at the previous image",
                    plan.image
                )
            })?;
        } else {
            debug!("Leaving the latest alias of {} alone", plan.name());
        }

        Ok(PublishResult {
            image: plan.image.clone(),
            latest: plan.latest.clone(),
        })
    }

    fn push_latest(&self, image: &Reference, latest: &Reference) -> Result<()> {
        info!("Moving {} to {image}", latest.to_string().bold());

        self.driver.tag(
            &TagOpts::builder()
                .src_image(image)
                .dest_image(latest)
                .build(),
        )?;
        self.driver
            .push(&PushOpts::builder().image(latest).build())
    }
}
