// crates/warden-cli/src/commands/init.rs
//
// `warden init`: create a fresh reputation record for a node.

use warden_core::identity::NodeId;

use super::Service;
use crate::output::{format_json, OutputFormat};

/// Run the init command.
pub async fn run(
    service: &Service,
    node: &NodeId,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    service.init(node).await?;
    tracing::info!(node_id = %node, "reputation record created");

    match format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&serde_json::json!({ "node_id": node, "created": true }))
        ),
        OutputFormat::Table => println!("Initialized reputation record for {}", node),
    }
    Ok(())
}
