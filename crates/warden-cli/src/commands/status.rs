// crates/warden-cli/src/commands/status.rs
//
// `warden status {disqualify, suspend, unsuspend, set}`: direct status
// transitions that bypass scoring.

use chrono::{DateTime, Utc};
use clap::Subcommand;

use warden_core::identity::NodeId;
use warden_core::record::ReputationStatus;

use super::Service;
use crate::output::{print_status, OutputFormat};

/// Status management subcommands.
#[derive(Debug, Subcommand)]
pub enum StatusCmd {
    /// Permanently disqualify a node.
    Disqualify {
        /// Hex-encoded 32-byte node ID.
        node: NodeId,
    },
    /// Suspend a node for unknown audits.
    Suspend {
        /// Hex-encoded 32-byte node ID.
        node: NodeId,
        /// Suspension start (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Lift an unknown-audit suspension.
    Unsuspend {
        /// Hex-encoded 32-byte node ID.
        node: NodeId,
    },
    /// Overwrite every status field. Omitted timestamps are cleared.
    Set {
        /// Hex-encoded 32-byte node ID.
        node: NodeId,
        #[arg(long)]
        contained: bool,
        #[arg(long)]
        disqualified: Option<DateTime<Utc>>,
        #[arg(long)]
        unknown_audit_suspended: Option<DateTime<Utc>>,
        #[arg(long)]
        offline_suspended: Option<DateTime<Utc>>,
        #[arg(long)]
        vetted_at: Option<DateTime<Utc>>,
    },
}

/// Run the status subcommand and print the resulting status.
pub async fn run(
    service: &Service,
    cmd: &StatusCmd,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let node = match cmd {
        StatusCmd::Disqualify { node } => {
            service.disqualify_node(node).await?;
            node
        }
        StatusCmd::Suspend { node, at } => {
            service
                .suspend_node_unknown_audit(node, at.unwrap_or_else(Utc::now))
                .await?;
            node
        }
        StatusCmd::Unsuspend { node } => {
            service.unsuspend_node_unknown_audit(node).await?;
            node
        }
        StatusCmd::Set {
            node,
            contained,
            disqualified,
            unknown_audit_suspended,
            offline_suspended,
            vetted_at,
        } => {
            let status = ReputationStatus {
                contained: *contained,
                disqualified: *disqualified,
                unknown_audit_suspended: *unknown_audit_suspended,
                offline_suspended: *offline_suspended,
                vetted_at: *vetted_at,
            };
            service.set_node_status(node, &status).await?;
            node
        }
    };

    let info = service.get(node).await?;
    print_status(&info.status(), None, format);
    Ok(())
}
