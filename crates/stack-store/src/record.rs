use infraviz_graph::{GraphEdge, GraphNode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Deploy lifecycle of a stack.
///
/// `Idle → Deploying → Deployed | Failed`; both terminal states may
/// re-enter `Deploying` on a later attempt. Generation and update never
/// drive terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    Idle,
    Deploying,
    Deployed,
    Failed,
}

impl DeployStatus {
    /// Whether moving to `next` is a legal step of the lifecycle.
    pub fn can_transition(self, next: DeployStatus) -> bool {
        matches!(
            (self, next),
            (DeployStatus::Idle, DeployStatus::Deploying)
                | (DeployStatus::Deploying, DeployStatus::Deployed)
                | (DeployStatus::Deploying, DeployStatus::Failed)
                | (DeployStatus::Deployed, DeployStatus::Deploying)
                | (DeployStatus::Failed, DeployStatus::Deploying)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeployStatus::Idle => "idle",
            DeployStatus::Deploying => "deploying",
            DeployStatus::Deployed => "deployed",
            DeployStatus::Failed => "failed",
        }
    }
}

/// One stack's state: generated program, rendered graph, deploy status.
///
/// `stack_id` is the identity and never changes across updates; neither
/// does `work_dir`. Updates replace `code`/`nodes`/`edges`/`deploy_status`
/// in place. The serialized form is the durable document written per stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackRecord {
    pub stack_id: String,
    pub code: String,
    pub work_dir: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub deploy_status: DeployStatus,
    /// Unix milliseconds at first generation.
    pub created_at: u64,
}

pub fn unix_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        assert!(DeployStatus::Idle.can_transition(DeployStatus::Deploying));
        assert!(DeployStatus::Deploying.can_transition(DeployStatus::Deployed));
        assert!(DeployStatus::Deploying.can_transition(DeployStatus::Failed));
        assert!(DeployStatus::Deployed.can_transition(DeployStatus::Deploying));
        assert!(DeployStatus::Failed.can_transition(DeployStatus::Deploying));
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        assert!(!DeployStatus::Idle.can_transition(DeployStatus::Deployed));
        assert!(!DeployStatus::Idle.can_transition(DeployStatus::Failed));
        assert!(!DeployStatus::Deploying.can_transition(DeployStatus::Deploying));
        assert!(!DeployStatus::Deployed.can_transition(DeployStatus::Failed));
        assert!(!DeployStatus::Failed.can_transition(DeployStatus::Deployed));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeployStatus::Deploying).unwrap(),
            "\"deploying\""
        );
        let parsed: DeployStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, DeployStatus::Failed);
    }

    #[test]
    fn test_record_round_trips_with_camel_case_keys() {
        let record = StackRecord {
            stack_id: "abc123def0".to_string(),
            code: "export {};".to_string(),
            work_dir: "/tmp/infra-abc123def0".to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
            deploy_status: DeployStatus::Idle,
            created_at: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["stackId"], "abc123def0");
        assert_eq!(json["workDir"], "/tmp/infra-abc123def0");
        assert_eq!(json["deployStatus"], "idle");
        assert_eq!(json["createdAt"], 1_700_000_000_000u64);

        let back: StackRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
