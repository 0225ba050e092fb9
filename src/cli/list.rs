//! `intrig list` - every registered instance with its probed liveness.

use intrig_types::ProjectInfo;

use crate::config;
use crate::discovery::probe::LivenessProbe;
use crate::discovery::registry::RegistryStore;
use crate::error::Result;
use crate::output;

pub async fn list(json: bool) -> Result<()> {
    let config = config::load()?;
    let store = RegistryStore::new();
    let probe = LivenessProbe::with_timeout(config.probe_timeout());

    let mut instances = Vec::new();
    for record in store.scan()? {
        let running = probe.is_daemon_running(&record).await;
        instances.push(ProjectInfo::from_metadata(record, running));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&instances)?);
    } else {
        println!("{}", output::format_instances(&instances).trim_end());
    }

    Ok(())
}
