use std::path::PathBuf;

use crate::client::SwitchboardClient;
use crate::output::{self, OutputConfig};

/// Sends a saved webhook payload to the server
///
/// The file is sent byte for byte, so a payload captured from the voice
/// platform reproduces the original delivery.
pub async fn execute(
    client: &SwitchboardClient,
    file: PathBuf,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = std::fs::read(&file).map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    client.replay(body).await?;
    output::print_success(&format!("Replayed {}", file.display()), config);
    Ok(())
}
