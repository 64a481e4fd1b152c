//! Utilities shared by agents and the trainer.
use anyhow::{Context, Result};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

/// Computes discounted returns `G_t = r_t + gamma * G_{t+1}` with `G_T = 0`.
///
/// The returned vector is aligned with `rewards`.
pub fn discounted_returns(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = vec![0f32; rewards.len()];
    let mut g = 0f32;
    for (t, r) in rewards.iter().enumerate().rev() {
        g = r + gamma * g;
        returns[t] = g;
    }
    returns
}

/// Returns `<path>.tmp`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

/// Writes a file through `<path>.tmp` followed by a rename, so that `path`
/// is either the previous content or the complete new one.
///
/// `write` receives the temporary path and must create the file there.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {:?}", dir))?;
        }
    }

    let tmp = tmp_path(path);
    if let Err(e) = write(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).with_context(|| format!("Failed to rename {:?} to {:?}", tmp, path))
}
