//! Startup configuration rendering.

use std::error::Error as _;
use std::path::Path;

use labrig_common::{LabError, LabResult};
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::NodeConfig;

/// Source of a node's startup configuration, chosen once per deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupTemplate {
    /// Template compiled into the driver, rendered with [`TemplateVars`].
    Embedded(&'static str),
    /// Contents of a user supplied file, written as-is.
    UserSupplied(String),
}

/// Values available to embedded templates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateVars {
    /// Node short name.
    pub short_name: String,
    /// Node long name.
    pub long_name: String,
    /// Management IPv4 gateway.
    pub mgmt_ipv4_gateway: Option<String>,
    /// Management IPv6 gateway.
    pub mgmt_ipv6_gateway: Option<String>,
    /// Default username of the node kind.
    pub username: String,
    /// Default password of the node kind.
    pub password: String,
}

impl TemplateVars {
    /// Collect template values from a node config and kind credentials.
    pub fn new(cfg: &NodeConfig, username: &str, password: &str) -> Self {
        Self {
            short_name: cfg.short_name.clone(),
            long_name: cfg.long_name.clone(),
            mgmt_ipv4_gateway: cfg.mgmt_ipv4_gateway.clone(),
            mgmt_ipv6_gateway: cfg.mgmt_ipv6_gateway.clone(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Renders a startup template to a file.
pub trait ConfigRenderer: Send + Sync {
    /// Render `template` to `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::Render`] if rendering or writing fails.
    fn render(&self, dst: &Path, template: &StartupTemplate, vars: &TemplateVars) -> LabResult<()>;
}

/// [`ConfigRenderer`] backed by Tera (Jinja2 syntax).
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraRenderer;

impl TeraRenderer {
    /// Render a template to a string.
    ///
    /// # Errors
    ///
    /// Returns an error message including the Tera error chain.
    pub fn render_str(template: &str, vars: &TemplateVars) -> Result<String, String> {
        let context = Context::from_serialize(vars).map_err(|e| error_chain(&e))?;
        Tera::one_off(template, &context, false).map_err(|e| error_chain(&e))
    }
}

impl ConfigRenderer for TeraRenderer {
    fn render(&self, dst: &Path, template: &StartupTemplate, vars: &TemplateVars) -> LabResult<()> {
        let rendered = match template {
            StartupTemplate::Embedded(text) => {
                Self::render_str(text, vars).map_err(|message| LabError::Render {
                    path: dst.to_path_buf(),
                    message,
                })?
            }
            StartupTemplate::UserSupplied(text) => text.clone(),
        };

        std::fs::write(dst, rendered).map_err(|e| LabError::Render {
            path: dst.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Generate a node's startup configuration at `dst`.
///
/// An existing file is kept so changes saved into a lab survive a redeploy,
/// unless the node carries a startup-config and enforces it.
///
/// # Errors
///
/// Returns an error if rendering fails.
pub fn generate_config(
    renderer: &dyn ConfigRenderer,
    cfg: &NodeConfig,
    dst: &Path,
    template: &StartupTemplate,
    vars: &TemplateVars,
) -> LabResult<()> {
    if dst.exists() && (cfg.startup_config.is_none() || !cfg.enforce_startup_config) {
        tracing::info!(
            node = %cfg.short_name,
            path = %dst.display(),
            "Config file already exists and will not be generated/reset"
        );
        return Ok(());
    }
    if cfg.enforce_startup_config {
        tracing::info!(node = %cfg.short_name, "Startup-config enforced, overwriting");
    }

    tracing::debug!(node = %cfg.short_name, path = %dst.display(), "Generating config");
    renderer.render(dst, template, vars)
}
