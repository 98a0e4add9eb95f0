use std::path::Path;

use bon::Builder;

#[derive(Debug, Clone, Builder)]
pub struct CloneOpts<'scope> {
    pub url: &'scope str,
    pub branch: &'scope str,
    pub dest: &'scope Path,
}

/// Options for an annotated tag.
#[derive(Debug, Clone, Builder)]
pub struct CreateTagOpts<'scope> {
    pub repo: &'scope Path,
    pub tag: &'scope str,
    pub message: &'scope str,
}
