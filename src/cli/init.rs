use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<&str>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(dir);
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(settings.statements_path())?;
    std::fs::create_dir_all(settings.storage_path())?;

    println!("Initialized bucketeer at {}", resolved.display());
    println!(
        "Drop statement exports (*.csv) into {}",
        settings.statements_path().display()
    );
    Ok(())
}
