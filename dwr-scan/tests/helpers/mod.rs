//! Dataset fixture helpers
//!
//! Builds small drone dataset trees under a temp directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp dataset root, canonicalized so paths compare equal to registry paths
pub struct Dataset {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub output: PathBuf,
}

impl Dataset {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let base = fs::canonicalize(temp_dir.path()).unwrap();
        let root = base.join("DroneAudioDataset");
        fs::create_dir_all(&root).unwrap();
        Self {
            _temp_dir: temp_dir,
            output: base.join("output").join("clean_wav_registry.json"),
            root,
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Write a short mono 16-bit WAV at `rel`
    pub fn wav(&self, rel: &str, sample_rate: u32, samples: usize) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..samples {
            writer.write_sample(((i % 64) as i16 - 32) * 256).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    /// Write raw bytes at `rel`
    pub fn raw(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }
}

pub fn assert_under(path: &Path, root: &Path) {
    assert!(
        path.starts_with(root),
        "{} is not under {}",
        path.display(),
        root.display()
    );
}
