use anyhow::{Context, Result};
use async_trait::async_trait;
use infraviz_graph::PreviewEvent;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::OnceCell;

/// Channel the deploy call streams its log lines into, as they arrive.
pub type LogSink = UnboundedSender<String>;

/// Planning/provisioning engine invoked out-of-process.
///
/// Preview may fail (callers fall back to a static program scan); deploy
/// failures carry the captured error and are never retried here. Timeout
/// and cancellation semantics belong to the engine itself.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Whether the environment allows spawning the engine at all.
    async fn supports_subprocess(&self) -> bool;

    async fn preview(&self, work_dir: &Path, stack_id: &str) -> Result<Vec<PreviewEvent>>;

    async fn deploy(&self, work_dir: &Path, stack_id: &str, logs: LogSink) -> Result<()>;
}

/// Drives the Pulumi CLI against a stack's work dir.
pub struct PulumiCli {
    supported: OnceCell<bool>,
}

impl PulumiCli {
    pub fn new() -> Self {
        Self {
            supported: OnceCell::new(),
        }
    }

    fn command(&self, work_dir: &Path) -> Command {
        let mut cmd = Command::new("pulumi");
        cmd.current_dir(work_dir)
            .env("PULUMI_SKIP_UPDATE_CHECK", "true")
            .stdin(Stdio::null());
        if std::env::var_os("PULUMI_CONFIG_PASSPHRASE").is_none() {
            cmd.env("PULUMI_CONFIG_PASSPHRASE", "");
        }
        cmd
    }

    async fn ensure_stack(&self, work_dir: &Path, stack_id: &str) -> Result<()> {
        let select = self
            .command(work_dir)
            .args(["stack", "select", stack_id])
            .output()
            .await
            .context("run pulumi stack select")?;
        if select.status.success() {
            return Ok(());
        }

        let init = self
            .command(work_dir)
            .args(["stack", "init", stack_id])
            .output()
            .await
            .context("run pulumi stack init")?;
        if init.status.success() {
            Ok(())
        } else {
            anyhow::bail!(
                "pulumi stack init failed: {}",
                String::from_utf8_lossy(&init.stderr).trim()
            )
        }
    }
}

impl Default for PulumiCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provisioner for PulumiCli {
    async fn supports_subprocess(&self) -> bool {
        *self
            .supported
            .get_or_init(|| async {
                match Command::new("pulumi").arg("version").output().await {
                    Ok(out) => out.status.success(),
                    Err(err) => {
                        log::warn!("Pulumi subprocess probe failed: {err}");
                        false
                    }
                }
            })
            .await
    }

    async fn preview(&self, work_dir: &Path, stack_id: &str) -> Result<Vec<PreviewEvent>> {
        self.ensure_stack(work_dir, stack_id).await?;

        let out = self
            .command(work_dir)
            .args(["preview", "--json", "--non-interactive"])
            .output()
            .await
            .context("run pulumi preview")?;
        if !out.status.success() {
            anyhow::bail!(
                "pulumi preview exited with {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }

        parse_preview_json(&out.stdout)
    }

    async fn deploy(&self, work_dir: &Path, stack_id: &str, logs: LogSink) -> Result<()> {
        self.ensure_stack(work_dir, stack_id).await?;

        let mut child = self
            .command(work_dir)
            .args(["up", "--yes", "--skip-preview", "--non-interactive"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("spawn pulumi up")?;

        let stdout = child.stdout.take().context("pulumi up stdout unavailable")?;
        let stderr = child.stderr.take().context("pulumi up stderr unavailable")?;

        // Drain stderr concurrently so a chatty engine cannot block on a
        // full pipe while we read stdout.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = BufReader::new(stderr).read_to_string(&mut buf).await;
            buf
        });

        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await.context("read pulumi up output")? {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                let _ = logs.send(trimmed.to_string());
            }
        }

        let status = child.wait().await.context("wait for pulumi up")?;
        let stderr_text = stderr_task.await.unwrap_or_default();
        if !status.success() {
            anyhow::bail!("pulumi up exited with {status}: {}", stderr_text.trim());
        }
        Ok(())
    }
}

/// Tolerant parse of `pulumi preview --json`: unknown fields are ignored
/// and steps without resource state are skipped, so CLI drift degrades to
/// the static fallback instead of failing the whole conversion.
fn parse_preview_json(bytes: &[u8]) -> Result<Vec<PreviewEvent>> {
    #[derive(Deserialize)]
    struct PreviewDocument {
        #[serde(default)]
        steps: Vec<PreviewStep>,
    }
    #[derive(Deserialize)]
    struct PreviewStep {
        op: Option<String>,
        urn: Option<String>,
        #[serde(rename = "newState")]
        new_state: Option<StepState>,
    }
    #[derive(Deserialize)]
    struct StepState {
        urn: Option<String>,
        #[serde(rename = "type")]
        resource_type: Option<String>,
        parent: Option<String>,
        #[serde(default)]
        dependencies: Vec<String>,
    }

    let doc: PreviewDocument =
        serde_json::from_slice(bytes).context("parse pulumi preview json")?;

    let events = doc
        .steps
        .into_iter()
        .filter_map(|step| {
            let state = step.new_state?;
            let urn = step.urn.or(state.urn)?;
            let resource_type = state.resource_type?;
            let mut event = PreviewEvent::new(
                urn,
                resource_type,
                step.op.unwrap_or_else(|| "create".to_string()),
            );
            event.parent = state.parent;
            event.dependencies = state.dependencies;
            Some(event)
        })
        .collect();
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_steps_become_events() {
        let json = br#"{
            "steps": [
                {
                    "op": "create",
                    "urn": "urn:pulumi:dev::proj::pulumi:pulumi:Stack::proj-dev",
                    "newState": { "type": "pulumi:pulumi:Stack" }
                },
                {
                    "op": "create",
                    "urn": "urn:pulumi:dev::proj::aws:ec2/vpc:Vpc::main",
                    "newState": {
                        "type": "aws:ec2/vpc:Vpc",
                        "parent": "urn:pulumi:dev::proj::pulumi:pulumi:Stack::proj-dev"
                    }
                },
                {
                    "op": "update",
                    "newState": {
                        "urn": "urn:pulumi:dev::proj::aws:s3/bucket:Bucket::assets",
                        "type": "aws:s3/bucket:Bucket",
                        "dependencies": ["urn:pulumi:dev::proj::aws:ec2/vpc:Vpc::main"]
                    }
                }
            ],
            "changeSummary": { "create": 2 }
        }"#;

        let events = parse_preview_json(json).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].resource_type, "aws:ec2/vpc:Vpc");
        assert_eq!(events[2].op, "update");
        assert_eq!(events[2].urn, "urn:pulumi:dev::proj::aws:s3/bucket:Bucket::assets");
        assert_eq!(events[2].dependencies.len(), 1);
    }

    #[test]
    fn test_steps_without_state_are_skipped() {
        let json = br#"{ "steps": [ { "op": "same", "urn": "urn:x" } ] }"#;
        assert!(parse_preview_json(json).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_output_is_an_error() {
        assert!(parse_preview_json(b"warning: no json here").is_err());
    }
}
