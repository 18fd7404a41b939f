#![allow(dead_code)]
//! On-disk shell scripts standing in for the external row-count command.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes an executable script that prints `stdout_body` and exits zero.
pub fn write_script(dir: &Path, name: &str, stdout_body: &str) -> PathBuf {
    write_raw(dir, name, &format!("#!/bin/sh\ncat <<'EOF'\n{stdout_body}\nEOF\n"))
}

/// Writes an executable script that exits with the given status.
pub fn write_failing_script(dir: &Path, name: &str, status: u8) -> PathBuf {
    write_raw(dir, name, &format!("#!/bin/sh\nexit {status}\n"))
}

fn write_raw(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}
