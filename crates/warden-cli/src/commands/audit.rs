// crates/warden-cli/src/commands/audit.rs
//
// `warden audit`: apply one audit outcome to a node's reputation.

use chrono::{DateTime, Utc};
use clap::Args;

use warden_core::audit::AuditOutcome;
use warden_core::identity::NodeId;

use super::Service;
use crate::output::{print_status, OutputFormat};

/// Arguments for the audit command.
#[derive(Debug, Args)]
pub struct AuditCmd {
    /// Hex-encoded 32-byte node ID.
    pub node: NodeId,

    /// Outcome: success, failure, unknown, or offline.
    #[arg(long)]
    pub outcome: AuditOutcome,

    /// When the audit happened (RFC 3339). Defaults to now.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Run the audit command.
pub async fn run(
    service: &Service,
    cmd: &AuditCmd,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let (status, changed) = match cmd.at {
        Some(at) => service.update_at(cmd.node, cmd.outcome, at).await?,
        None => service.apply_audit(cmd.node, cmd.outcome).await?,
    };

    if status.is_disqualified() && changed {
        tracing::warn!(node_id = %cmd.node, "node disqualified by this audit");
    }
    print_status(&status, Some(changed), format);
    Ok(())
}
