use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ctl::BlockStore;
use log::info;

/// Path of the rendered model `name` in `dir`.
pub fn model_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.ctl", name))
}

/// Path of the change log of model `name` in `dir`.
pub fn log_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}_log.json", name))
}

/// Fails when saving model `name` into `dir` would overwrite `input`.
pub fn check_not_input(input: &Path, dir: &Path, name: &str) -> io::Result<()> {
    let target = model_path(dir, name);
    // A target that does not exist yet cannot be the input file.
    let (Ok(input), Ok(target)) = (input.canonicalize(), target.canonicalize()) else {
        return Ok(());
    };
    if input == target {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "'{}' is the input model; choose another --name or output_dir",
                target.display()
            ),
        ));
    }
    Ok(())
}

pub fn save_model(store: &BlockStore, name: &str, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = model_path(dir, name);
    fs::write(&path, store.render())?;
    info!("model saved to '{}'", path.display());
    Ok(path)
}

pub fn save_change_log(
    store: &BlockStore,
    name: &str,
    dir: &Path,
    indent: usize,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = log_path(dir, name);
    let json = store.change_log().to_json(indent)?;
    fs::write(&path, json)?;
    info!("change log saved to '{}'", path.display());
    Ok(path)
}

/// Save both the model and its change log.
pub fn save(store: &BlockStore, name: &str, dir: &Path, indent: usize) -> io::Result<(PathBuf, PathBuf)> {
    let model = save_model(store, name, dir)?;
    let log = save_change_log(store, name, dir, indent)?;
    Ok((model, log))
}
