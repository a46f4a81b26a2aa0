use clap::Subcommand;
use switchboard::dto::ListRequestsQuery;
use switchboard::models::RequestStatus;

use crate::client::SwitchboardClient;
use crate::output::{self, OutputConfig};

/// Maintenance request commands
#[derive(Subcommand, Debug)]
pub enum RequestCommands {
    /// List maintenance requests, newest first
    List {
        /// Only requests in this status (new, assigned, in_progress, completed, cancelled)
        #[clap(long)]
        status: Option<RequestStatus>,
        /// Only emergencies
        #[clap(long, conflicts_with = "non_emergency")]
        emergency: bool,
        /// Only non-emergencies
        #[clap(long)]
        non_emergency: bool,
        /// Only requests in this workspace
        #[clap(long)]
        workspace: Option<String>,
        /// Maximum number of requests to show
        #[clap(long)]
        limit: Option<i64>,
    },
    /// Show one maintenance request
    Show {
        /// The request ID
        id: String,
    },
    /// Show a request's activity log
    Activity {
        /// The request ID
        id: String,
    },
    /// Move a request to a new status
    SetStatus {
        /// The request ID
        id: String,
        /// The new status
        status: RequestStatus,
    },
}

fn emergency_filter(emergency: bool, non_emergency: bool) -> Option<bool> {
    match (emergency, non_emergency) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Executes a maintenance request command
pub async fn execute(
    client: &SwitchboardClient,
    cmd: RequestCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RequestCommands::List { status, emergency, non_emergency, workspace, limit } => {
            let query = ListRequestsQuery {
                status,
                emergency: emergency_filter(emergency, non_emergency),
                workspace_id: workspace,
                limit,
            };
            let requests = client.list_requests(&query).await?;
            output::print_requests(&requests, config);
        }
        RequestCommands::Show { id } => match client.get_request(&id).await? {
            Some(request) => output::print_request(&request, config),
            None => return Err(format!("Maintenance request {} not found", id).into()),
        },
        RequestCommands::Activity { id } => {
            let entries = client.list_activity(&id).await?;
            output::print_activity(&entries, config);
        }
        RequestCommands::SetStatus { id, status } => {
            let request = client.set_status(&id, status).await?;
            output::print_success(&format!("Request {} is now {}", request.ticket_number, request.status), config);
        }
    }
    Ok(())
}
