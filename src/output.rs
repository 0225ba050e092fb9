use tabled::{Table, Tabled};

use intrig_types::ProjectInfo;

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "PID")]
    pid: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&ProjectInfo> for InstanceRow {
    fn from(info: &ProjectInfo) -> Self {
        Self {
            name: info.project_name.clone(),
            kind: info.kind.clone(),
            url: info.url.clone(),
            pid: info.metadata.pid.to_string(),
            status: status_label(info).to_string(),
            path: info.path.display().to_string(),
        }
    }
}

fn status_label(info: &ProjectInfo) -> &'static str {
    if info.running { "running" } else { "stale" }
}

pub fn format_instances(instances: &[ProjectInfo]) -> String {
    if instances.is_empty() {
        return "No registered daemons found.\n".to_string();
    }
    let rows: Vec<InstanceRow> = instances.iter().map(InstanceRow::from).collect();
    Table::new(rows).to_string()
}

pub fn format_instance(info: &ProjectInfo) -> String {
    let mut output = String::new();
    output.push_str(&format!("Project: {}\n", info.project_name));
    output.push_str(&format!("  Type:       {}\n", info.kind));
    output.push_str(&format!("  URL:        {}\n", info.url));
    output.push_str(&format!("  Port:       {}\n", info.port));
    output.push_str(&format!("  PID:        {}\n", info.metadata.pid));
    output.push_str(&format!("  Status:     {}\n", status_label(info)));
    output.push_str(&format!("  Path:       {}\n", info.path.display()));
    match format_age(&info.metadata.timestamp) {
        Some(age) => output.push_str(&format!(
            "  Registered: {} ({})\n",
            info.metadata.timestamp, age
        )),
        None => output.push_str(&format!("  Registered: {}\n", info.metadata.timestamp)),
    }
    output
}

/// Rough age of a registration for the detail view. `None` when the
/// recorded timestamp does not parse (it is free-form on the wire).
fn format_age(timestamp: &str) -> Option<String> {
    let registered = chrono::DateTime::parse_from_rfc3339(timestamp).ok()?;
    let age = chrono::Utc::now().signed_duration_since(registered);
    if age.num_days() > 0 {
        Some(format!("{}d ago", age.num_days()))
    } else if age.num_hours() > 0 {
        Some(format!("{}h ago", age.num_hours()))
    } else {
        Some(format!("{}m ago", age.num_minutes().max(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intrig_types::DiscoveryMetadata;
    use std::path::PathBuf;

    fn info(running: bool) -> ProjectInfo {
        let metadata = DiscoveryMetadata {
            project_name: "petstore".to_string(),
            url: "http://127.0.0.1:5050".to_string(),
            port: 5050,
            pid: 4242,
            timestamp: "2026-02-08T10:00:00+00:00".to_string(),
            path: PathBuf::from("/repo/petstore"),
            kind: "next".to_string(),
        };
        ProjectInfo::from_metadata(metadata, running)
    }

    #[test]
    fn test_empty_listing_message() {
        assert_eq!(format_instances(&[]), "No registered daemons found.\n");
    }

    #[test]
    fn test_table_contains_instance_fields() {
        let table = format_instances(&[info(true)]);
        assert!(table.contains("petstore"));
        assert!(table.contains("running"));
        assert!(table.contains("http://127.0.0.1:5050"));
    }

    #[test]
    fn test_detail_view_marks_stale_records() {
        let detail = format_instance(&info(false));
        assert!(detail.contains("Status:     stale"));
        assert!(detail.contains("PID:        4242"));
    }

    #[test]
    fn test_age_formatting() {
        let recent = chrono::Utc::now().to_rfc3339();
        assert!(format_age(&recent).unwrap().ends_with("m ago"));

        // Free-form timestamps from other bindings degrade gracefully
        assert!(format_age("last tuesday").is_none());
    }
}
