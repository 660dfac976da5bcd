// crates/warden-cli/src/commands/get.rs
//
// `warden get`: display a node's full reputation.

use warden_core::identity::NodeId;

use super::Service;
use crate::output::{print_info, OutputFormat};

/// Run the get command.
pub async fn run(
    service: &Service,
    node: &NodeId,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let info = service.get(node).await?;
    if format == OutputFormat::Table {
        println!("Reputation of {}", node);
        println!();
    }
    print_info(&info, format);
    Ok(())
}
