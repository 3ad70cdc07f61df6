//! JSON persistence for intrinsics, configuration and recorded detections.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use augment_core::Intrinsics;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AugmentConfig;
use crate::detect::RecordedFrame;

pub fn load_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

pub fn write_json_file<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Save as `{ "camera_matrix": [[..],[..],[..]], "distortion": [..] }`.
pub fn save_intrinsics(path: impl AsRef<Path>, intrinsics: &Intrinsics) -> Result<()> {
    write_json_file(path, intrinsics)
}

pub fn load_intrinsics(path: impl AsRef<Path>) -> Result<Intrinsics> {
    load_json_file(path)
}

/// Load and validate a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AugmentConfig> {
    let path = path.as_ref();
    let config: AugmentConfig = load_json_file(path)?;
    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok(config)
}

/// Load a recorded-detections file.
///
/// Relative image paths are resolved against the file's directory.
pub fn load_recording(path: impl AsRef<Path>) -> Result<Vec<RecordedFrame>> {
    let path = path.as_ref();
    let mut frames: Vec<RecordedFrame> = load_json_file(path)?;
    if let Some(dir) = path.parent() {
        for image in frames.iter_mut().filter_map(|f| f.image.as_mut()) {
            if image.is_relative() {
                *image = dir.join(&*image);
            }
        }
    }
    Ok(frames)
}
