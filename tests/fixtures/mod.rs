//! Test fixtures shared by the integration tests
//!
//! `sample_project/` is a project root with a `garfield.toml` and
//! `.env.<environment>` files under `env/`.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Path to the sample project fixture
pub fn sample_project_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_project")
}

/// Copy the sample project into `dest` so tests can modify it
pub fn copy_sample_project(dest: &Path) -> io::Result<()> {
    copy_dir(&sample_project_path(), dest)
}

fn copy_dir(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
