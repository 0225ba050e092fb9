//! `intrig up` - run the full readiness sequence for a project.

use std::path::PathBuf;

use crate::config;
use crate::discovery::lifecycle::LifecycleController;
use crate::discovery::registry::RegistryStore;
use crate::error::Result;

pub async fn up(path: Option<PathBuf>, json: bool) -> Result<()> {
    let config = config::load()?;
    let controller = LifecycleController::new(RegistryStore::new(), &config);

    let target = match path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let info = controller.get_project(&target).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Daemon ready: {} at {}", info.project_name, info.url);
    }

    Ok(())
}
