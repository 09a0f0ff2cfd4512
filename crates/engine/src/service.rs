use crate::codegen::CodeGenerator;
use crate::error::{EngineError, Result};
use crate::ids::new_stack_id;
use crate::program::write_program;
use crate::provision::Provisioner;
use crate::static_parse::parse_resources_from_code;
use infraviz_cost::{estimate_monthly_cost, total_estimated_cost};
use infraviz_graph::{GraphBuilder, GraphEdge, GraphNode, InfraGraph};
use infraviz_stack_store::{unix_ms_now, DeployStatus, StackRecord, StackStore};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Graph handed to callers/UI after a generate or update call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub stack_id: String,
    pub total_estimated_cost: f64,
    pub description: String,
    pub subprocess_supported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployOutcome {
    Deployed,
    Failed,
}

/// Structured deploy outcome; deploy never surfaces an exception.
#[derive(Debug, Clone, Serialize)]
pub struct DeployResult {
    pub status: DeployOutcome,
    pub message: String,
    pub logs: Vec<String>,
}

impl DeployResult {
    fn failed(message: impl Into<String>, logs: Vec<String>) -> Self {
        Self {
            status: DeployOutcome::Failed,
            message: message.into(),
            logs,
        }
    }
}

/// Orchestrates the stack lifecycle across the collaborators and the
/// store. Update and deploy hold the store's per-stack lock across their
/// whole read → compute → write sequence, so racing calls for one stack
/// serialize instead of losing updates.
pub struct InfraService {
    store: Arc<StackStore>,
    codegen: Box<dyn CodeGenerator>,
    provisioner: Box<dyn Provisioner>,
}

impl InfraService {
    pub fn new(
        store: Arc<StackStore>,
        codegen: Box<dyn CodeGenerator>,
        provisioner: Box<dyn Provisioner>,
    ) -> Self {
        Self {
            store,
            codegen,
            provisioner,
        }
    }

    pub fn store(&self) -> &Arc<StackStore> {
        &self.store
    }

    /// Generate a brand-new stack from a natural language description.
    pub async fn generate(&self, description: &str) -> Result<GraphPayload> {
        let stack_id = new_stack_id();
        let work_dir = self.store.stack_dir(&stack_id);

        let code = self
            .codegen
            .generate(description)
            .await
            .map_err(|err| EngineError::CodeGeneration(format!("{err:#}")))?;

        let (graph, total) = self.build_annotated_graph(&code, &stack_id, &work_dir).await;

        let record = StackRecord {
            stack_id: stack_id.clone(),
            code,
            work_dir: work_dir.to_string_lossy().into_owned(),
            nodes: graph.nodes.clone(),
            edges: graph.edges.clone(),
            deploy_status: DeployStatus::Idle,
            created_at: unix_ms_now(),
        };
        self.store.set(record).await;

        Ok(GraphPayload {
            nodes: graph.nodes,
            edges: graph.edges,
            stack_id,
            total_estimated_cost: total,
            description: description.to_string(),
            subprocess_supported: self.provisioner.supports_subprocess().await,
        })
    }

    /// Apply a change description to an existing stack. Identity fields
    /// (`stack_id`, `work_dir`, `created_at`) and the deploy status are
    /// preserved; code and graph are replaced.
    pub async fn update(&self, stack_id: &str, change_description: &str) -> Result<GraphPayload> {
        let lock = self.store.lock(stack_id);
        let _guard = lock.lock().await;

        let record = self
            .store
            .get(stack_id)
            .await
            .ok_or_else(|| EngineError::StackNotFound(stack_id.to_string()))?;

        let code = self
            .codegen
            .update(&record.code, change_description)
            .await
            .map_err(|err| EngineError::CodeGeneration(format!("{err:#}")))?;

        let (graph, total) = self
            .build_annotated_graph(&code, stack_id, Path::new(&record.work_dir))
            .await;

        let updated = StackRecord {
            code,
            nodes: graph.nodes.clone(),
            edges: graph.edges.clone(),
            ..record
        };
        self.store.set(updated).await;

        Ok(GraphPayload {
            nodes: graph.nodes,
            edges: graph.edges,
            stack_id: stack_id.to_string(),
            total_estimated_cost: total,
            description: change_description.to_string(),
            subprocess_supported: self.provisioner.supports_subprocess().await,
        })
    }

    /// Run a deploy attempt through the lifecycle:
    /// set `Deploying`, invoke the collaborator with a streaming log
    /// channel, then land on `Deployed` or `Failed`. Collaborator failures
    /// are captured into the result, never re-thrown.
    pub async fn deploy(&self, stack_id: &str) -> DeployResult {
        let lock = self.store.lock(stack_id);
        let _guard = lock.lock().await;

        let Some(record) = self.store.get(stack_id).await else {
            return DeployResult::failed(format!("Stack \"{stack_id}\" not found"), Vec::new());
        };

        if !self.provisioner.supports_subprocess().await {
            return DeployResult::failed(
                "Deploy is not supported in this environment (subprocess blocked). \
                 Visualization is still available.",
                vec![
                    "[error] Provisioning subprocess is not supported in this sandbox environment."
                        .to_string(),
                ],
            );
        }

        if !record.deploy_status.can_transition(DeployStatus::Deploying) {
            return DeployResult::failed(
                format!("Stack \"{stack_id}\" already has a deploy in progress"),
                Vec::new(),
            );
        }

        self.set_status(&record, DeployStatus::Deploying).await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = self
            .provisioner
            .deploy(Path::new(&record.work_dir), stack_id, tx)
            .await;

        let mut logs = Vec::new();
        while let Some(line) = rx.recv().await {
            logs.push(line);
        }

        match outcome {
            Ok(()) => {
                self.set_status(&record, DeployStatus::Deployed).await;
                let created = logs
                    .iter()
                    .filter(|line| line.to_lowercase().contains("created") || line.contains('+'))
                    .count();
                DeployResult {
                    status: DeployOutcome::Deployed,
                    message: format!("Deployed successfully. ~{created} resources created."),
                    logs,
                }
            }
            Err(err) => {
                let err = format!("{err:#}");
                logs.push(format!("[error] {err}"));
                self.set_status(&record, DeployStatus::Failed).await;
                DeployResult::failed(format!("Deploy failed: {err}"), logs)
            }
        }
    }

    async fn set_status(&self, record: &StackRecord, status: DeployStatus) {
        let mut updated = record.clone();
        updated.deploy_status = status;
        self.store.set(updated).await;
    }

    /// Preview the program (static scan fallback), convert to a graph,
    /// annotate per-node costs, and compute the conservative aggregate.
    async fn build_annotated_graph(
        &self,
        code: &str,
        stack_id: &str,
        work_dir: &Path,
    ) -> (InfraGraph, f64) {
        let events = match write_program(work_dir, code).await {
            Ok(()) => match self.provisioner.preview(work_dir, stack_id).await {
                Ok(events) => events,
                Err(err) => {
                    log::warn!("Preview for stack {stack_id} failed, using static scan: {err:#}");
                    parse_resources_from_code(code)
                }
            },
            Err(err) => {
                log::warn!("Cannot write program for stack {stack_id}, using static scan: {err:#}");
                parse_resources_from_code(code)
            }
        };

        let mut graph = GraphBuilder::new().build(&events);
        for node in &mut graph.nodes {
            node.data.estimated_cost = estimate_monthly_cost(&node.data.resource_type);
        }
        let total = total_estimated_cost(graph.nodes.iter().map(|n| n.data.resource_type.as_str()));
        (graph, total)
    }
}
