//! `intrig clean` - drop registry records whose daemons are gone.
//!
//! Stale records are harmless (every reader probes before trusting one), so
//! nothing ever sweeps them automatically. This command is the explicit
//! opt-in for tidying long-running machines.

use crate::config;
use crate::discovery::probe::LivenessProbe;
use crate::discovery::registry::RegistryStore;
use crate::error::Result;

pub async fn clean() -> Result<()> {
    let config = config::load()?;
    let store = RegistryStore::new();
    let probe = LivenessProbe::with_timeout(config.probe_timeout());

    let mut removed = 0;
    for record in store.scan()? {
        if !probe.is_daemon_running(&record).await {
            store.remove(&store.file_path_for(&record.path));
            println!(
                "Removed stale record: {} (port {})",
                record.project_name, record.port
            );
            removed += 1;
        }
    }

    if removed == 0 {
        println!("No stale records found.");
    } else {
        println!("Removed {} stale record(s).", removed);
    }

    Ok(())
}
