//! `intrig sync` - regenerate a project's client code when needed.

use std::path::PathBuf;

use intrig_types::GenerateEvent;

use crate::config;
use crate::discovery::lifecycle::LifecycleController;
use crate::discovery::registry::RegistryStore;
use crate::error::Result;
use crate::sync::client::DaemonApi;
use crate::sync::trigger::{ChangeDetector, SyncOutcome};

pub async fn sync(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config = config::load()?;
    let controller = LifecycleController::new(RegistryStore::new(), &config);
    let api = DaemonApi::new(&config)?;
    let detector = ChangeDetector::new(controller, api);

    let target = match path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let outcome = detector
        .sync(&target, force, |event| {
            if let GenerateEvent::Status { step, source_id } = event {
                match source_id {
                    Some(source) => println!("  {} ({})", step, source),
                    None => println!("  {}", step),
                }
            }
        })
        .await?;

    match outcome {
        SyncOutcome::Skipped => {
            println!("Not an intrig project: no intrig config found in {}", target.display());
        }
        SyncOutcome::UpToDate => println!("Generated code is up to date."),
        SyncOutcome::Regenerated => println!("Regeneration complete."),
    }

    Ok(())
}
