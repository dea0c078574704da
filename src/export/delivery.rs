//! Delivery of rendered exports
//!
//! The facade hands every successful render to a [`Delivery`]. Hosts pick
//! the mechanism: a file write, an HTTP response body, or simply keeping
//! the payload in memory.

use super::{ExportError, RenderedExport};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Sink for named export payloads
pub trait Delivery {
    fn deliver(&self, export: &RenderedExport) -> Result<(), ExportError>;
}

impl<D: Delivery + ?Sized> Delivery for &D {
    fn deliver(&self, export: &RenderedExport) -> Result<(), ExportError> {
        (**self).deliver(export)
    }
}

/// Writes each export as `<directory>/<filename>`
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    directory: PathBuf,
    overwrite: bool,
}

impl DirectoryDelivery {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            overwrite: false,
        }
    }

    /// Allow replacing files that already exist
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Destination path for a filename
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }
}

impl Delivery for DirectoryDelivery {
    fn deliver(&self, export: &RenderedExport) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| {
            ExportError::DeliveryError(format!(
                "Failed to create directory {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        let path = self.path_for(&export.filename);
        if path.exists() && !self.overwrite {
            return Err(ExportError::DeliveryError(format!(
                "Output file exists: {}",
                path.display()
            )));
        }

        std::fs::write(&path, export.data.as_bytes()).map_err(|e| {
            ExportError::DeliveryError(format!("Failed to write {}: {}", path.display(), e))
        })?;
        info!(
            "Delivered {} ({}, {} bytes)",
            path.display(),
            export.mime_type,
            export.data.len()
        );
        Ok(())
    }
}

/// Keeps delivered exports in memory
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    delivered: Mutex<Vec<RenderedExport>>,
}

impl MemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far
    pub fn delivered(&self) -> Vec<RenderedExport> {
        match self.delivered.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.delivered().len()
    }
}

impl Delivery for MemoryDelivery {
    fn deliver(&self, export: &RenderedExport) -> Result<(), ExportError> {
        let mut guard = self
            .delivered
            .lock()
            .map_err(|e| ExportError::DeliveryError(e.to_string()))?;
        guard.push(export.clone());
        Ok(())
    }
}
