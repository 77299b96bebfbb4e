//! `ansible-provision apply`: provision the host named in the provisioning file.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::application::services::resource::{apply_resource, validate_resource};
use crate::application::services::retry::FixedInterval;
use crate::infra::config::YamlConfigFile;
use crate::infra::fs::LocalPathResolver;
use crate::infra::ssh::SshCommunicator;
use crate::output::{OutputContext, TerminalSink, json, progress};

/// Arguments shared by commands that read a provisioning file.
#[derive(Args)]
pub struct ConfigArgs {
    /// Provisioning file (default: $ANSIBLE_PROVISION_CONFIG or ./provision.yaml)
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Run `ansible-provision apply [--config <file>]`.
///
/// Streams every bootstrap and playbook line as it arrives. In `--json` mode
/// the stream is suppressed and a single result object is printed instead;
/// a provisioning failure is then reported only in that object and yields
/// `ExitCode::FAILURE`.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded, validation fails, the host
/// stays unreachable for the whole connection timeout, or a remote command
/// fails.
pub async fn run(ctx: &OutputContext, args: &ConfigArgs, json_output: bool) -> Result<ExitCode> {
    let resolver = LocalPathResolver::new();
    let file = YamlConfigFile::locate(args.config.as_deref(), &resolver)?;
    let settings = file.load()?;
    let target = settings.connection.destination();

    let report = validate_resource(&settings.provisioner, &resolver);
    if !json_output {
        ctx.header(&format!("Provisioning {target}"));
        ctx.kv("config", &file.path().display().to_string());
        ctx.kv("playbook", &settings.provisioner.playbook);
        for warning in &report.warnings {
            ctx.warn(warning);
        }
    }

    let comm = SshCommunicator::default_runner(settings.connection.clone())?;
    let quiet_ctx;
    let sink_ctx = if json_output {
        quiet_ctx = OutputContext::new(true, true);
        &quiet_ctx
    } else {
        ctx
    };
    let mut sink = TerminalSink::new(sink_ctx);
    if !json_output && ctx.show_progress() {
        sink = sink.with_spinner(progress::spinner(&format!("Provisioning {target}")));
    }

    let result = apply_resource(
        &sink,
        &settings.connection,
        &settings.provisioner,
        &comm,
        &resolver,
        FixedInterval::default(),
    )
    .await;

    if let Some(pb) = sink.spinner() {
        match &result {
            Ok(()) => progress::finish_ok(pb, &format!("Provisioned {target}")),
            Err(_) => progress::finish_error(pb, &format!("Provisioning {target} failed")),
        }
    }

    match result {
        Ok(()) if json_output => {
            let out = serde_json::json!({ "provisioned": true, "target": target });
            println!("{}", json::format_report(&out)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(()) => {
            ctx.success(&format!("{target} provisioned"));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if json_output => {
            tracing::debug!(error = %format!("{e:#}"), "provisioning failed");
            println!("{}", json::format_error(&format!("{e:#}"), "PROVISION_FAILED")?);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}
