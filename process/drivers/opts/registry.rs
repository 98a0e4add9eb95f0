use bon::Builder;
use container_deploy_utils::credentials::Credentials;
use oci_distribution::Reference;

#[derive(Debug, Clone, Builder)]
pub struct LoginOpts<'scope> {
    pub registry: &'scope str,
    pub credentials: &'scope Credentials,
}

#[derive(Debug, Clone, Builder)]
pub struct TagOpts<'scope> {
    pub src_image: &'scope Reference,
    pub dest_image: &'scope Reference,
}

#[derive(Debug, Clone, Builder)]
pub struct PushOpts<'scope> {
    pub image: &'scope Reference,
}
