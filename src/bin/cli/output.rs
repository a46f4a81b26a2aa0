use clap::ValueEnum;
use serde::Serialize;
use switchboard::models::{ActivityLog, MaintenanceRequest};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// Cuts `text` to at most `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Prints a list of maintenance requests in the specified format
pub fn print_requests(requests: &[MaintenanceRequest], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if requests.is_empty() {
                if !config.quiet {
                    println!("No maintenance requests found.");
                }
                return;
            }
            if config.quiet {
                for request in requests {
                    println!("{}", request.id);
                }
                return;
            }
            let id_w = requests.iter().map(|r| r.id.len()).max().unwrap_or(2);
            println!(
                "{:<id_w$}  {:<11}  {:<11}  {:<9}  {:<3}  {:<20}  ISSUE",
                "ID", "TICKET", "STATUS", "URGENCY", "!!", "CALLER",
            );
            for request in requests {
                println!(
                    "{:<id_w$}  {:<11}  {:<11}  {:<9}  {:<3}  {:<20}  {}",
                    request.id,
                    request.ticket_number,
                    request.status.as_str(),
                    request.urgency.as_str(),
                    if request.is_emergency { "yes" } else { "" },
                    truncate(or_dash(request.caller_name.as_deref()), 20),
                    truncate(or_dash(request.issue_description.as_deref()), 48),
                );
            }
        }
        OutputFormat::Json => print_json(requests),
    }
}

/// Prints a single maintenance request in the specified format
pub fn print_request(request: &MaintenanceRequest, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", request.id);
                return;
            }
            println!("ID:          {}", request.id);
            println!("Ticket:      {}", request.ticket_number);
            println!("Call:        {} ({})", request.call_id, request.call_status.as_str());
            println!("Status:      {}", request.status.as_str());
            println!(
                "Urgency:     {}{}",
                request.urgency.as_str(),
                if request.is_emergency { "  EMERGENCY" } else { "" }
            );
            println!("Caller:      {}", or_dash(request.caller_name.as_deref()));
            println!("Phone:       {}", or_dash(request.caller_phone.as_deref()));
            println!("Address:     {}", or_dash(request.property_address.as_deref()));
            println!("Unit:        {}", or_dash(request.unit_number.as_deref()));
            println!("Category:    {}", or_dash(request.issue_category.as_deref()));
            println!("Issue:       {}", or_dash(request.issue_description.as_deref()));
            if let Some(summary) = &request.summary {
                println!("Summary:     {}", summary);
            }
            println!("Created:     {}", request.created_at);
            println!("Updated:     {}", request.updated_at);
        }
        OutputFormat::Json => print_json(request),
    }
}

/// Prints a request's activity log in the specified format
pub fn print_activity(entries: &[ActivityLog], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if entries.is_empty() {
                if !config.quiet {
                    println!("No activity recorded.");
                }
                return;
            }
            for entry in entries {
                if config.quiet {
                    println!("{}", entry.get_action());
                } else {
                    println!("{}  {:<30}  {}", entry.get_created_at(), entry.get_action(), entry.get_details());
                }
            }
        }
        OutputFormat::Json => print_json(entries),
    }
}

/// Prints an arbitrary JSON value; human mode prints it compactly
pub fn print_value(value: &serde_json::Value, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", value);
            }
        }
        OutputFormat::Json => print_json(value),
    }
}

/// Prints a success message in the specified format
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({"status": "ok", "message": message})),
    }
}
