//! `ansible-provision validate`: check a provisioning file without connecting.

use std::process::ExitCode;

use anyhow::Result;

use crate::application::services::resource::validate_resource;
use crate::commands::apply::ConfigArgs;
use crate::infra::config::YamlConfigFile;
use crate::infra::fs::LocalPathResolver;
use crate::output::{OutputContext, json};

/// Run `ansible-provision validate [--config <file>]`.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the configuration has
/// validation errors. Warnings alone succeed. In `--json` mode validation
/// errors are reported only in the printed report.
pub fn run(ctx: &OutputContext, args: &ConfigArgs, json_output: bool) -> Result<ExitCode> {
    let resolver = LocalPathResolver::new();
    let file = YamlConfigFile::locate(args.config.as_deref(), &resolver)?;
    let settings = file.load()?;
    let report = validate_resource(&settings.provisioner, &resolver);

    if json_output {
        println!("{}", json::format_report(&report)?);
    } else {
        ctx.header(&format!("Validating {}", file.path().display()));
        for warning in &report.warnings {
            ctx.warn(warning);
        }
        for error in &report.errors {
            ctx.error(error);
        }
        if report.is_ok() {
            ctx.success("configuration is valid");
        }
    }

    if report.is_ok() {
        Ok(ExitCode::SUCCESS)
    } else if json_output {
        Ok(ExitCode::FAILURE)
    } else {
        anyhow::bail!("configuration has {} error(s)", report.errors.len());
    }
}
