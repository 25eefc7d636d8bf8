//! Access to the test resources shared by the crates in the workspace.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

pub fn read_shared_resource(name: &'static str) -> String {
    fs::read_to_string(shared_resource_path(name)).expect("Unable to read file")
}

pub fn shared_resource_path(name: &'static str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("..");
    path.push("resources");
    path.push("test");
    path.push(name);
    path
}

/// Copies the shared resource directory into `dest` so that a test can
/// modify the files.
pub fn copy_shared_resource_dir(name: &'static str, dest: &Path) -> io::Result<()> {
    let src = shared_resource_path(name);
    for entry in WalkDir::new(&src).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(&src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
