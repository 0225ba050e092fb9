//! `intrig status` - resolve a path or name and report what was found.

use intrig_types::ProjectInfo;

use crate::config;
use crate::discovery::probe::LivenessProbe;
use crate::discovery::registry::RegistryStore;
use crate::discovery::resolver::Resolver;
use crate::error::{IntrigError, Result};
use crate::output;

pub async fn status(identifier: Option<String>, json: bool) -> Result<()> {
    let config = config::load()?;
    let resolver = Resolver::new(RegistryStore::new());
    let probe = LivenessProbe::with_timeout(config.probe_timeout());

    let metadata = match &identifier {
        Some(ident) => resolver.resolve_identifier(ident)?,
        None => {
            let cwd = std::env::current_dir()?;
            resolver.resolve_by_path(&cwd)?
        }
    };

    let metadata = metadata.ok_or_else(|| {
        IntrigError::ProjectNotFound(identifier.unwrap_or_else(|| "current directory".to_string()))
    })?;

    let running = probe.is_daemon_running(&metadata).await;
    let info = ProjectInfo::from_metadata(metadata, running);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print!("{}", output::format_instance(&info));
        if !info.running {
            println!("  (record is stale; 'intrig up' restarts the daemon)");
        }
    }

    Ok(())
}
