use anyhow::{anyhow, Context as _, Result};
use gphoto2::list::CameraDescriptor;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, trace};

/// A camera spotted during autodetection.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedCamera {
    pub index: usize,
    pub model: String,
    pub port: String,
}

/// One storage on the camera, with whatever fields the driver reports.
#[derive(Debug, Serialize)]
pub struct StorageReport {
    pub label: Option<String>,
    pub base_dir: Option<String>,
    pub description: Option<String>,
    pub capacity_kb: Option<usize>,
    pub free_kb: Option<usize>,
}

/// File access on an attached device.
///
/// Folder arguments are full device paths like `/store_00010001/DCIM`;
/// returned entries are bare names relative to that folder.
pub trait DeviceFiles {
    fn files_in(&self, folder: &str) -> Result<Vec<String>>;
    fn folders_in(&self, folder: &str) -> Result<Vec<String>>;
    fn fetch(&self, folder: &str, name: &str, dest: &Path) -> Result<()>;
}

/// Entry point to the cameras on this machine.
pub struct CameraHub {
    context: gphoto2::Context,
}

impl CameraHub {
    pub fn new() -> Result<Self> {
        let context = gphoto2::Context::new().context("failed to initialize gphoto2")?;
        Ok(Self { context })
    }

    /// All cameras the USB autodetection can see right now.
    pub fn detect(&self) -> Result<Vec<DetectedCamera>> {
        let cameras = self
            .context
            .list_cameras()
            .wait()
            .context("camera autodetection failed")?;

        Ok(cameras
            .enumerate()
            .map(|(index, CameraDescriptor { model, port })| DetectedCamera { index, model, port })
            .collect())
    }

    /// Opens the camera at `index` in autodetection order.
    pub fn open(&self, index: usize) -> Result<OpenCamera> {
        let detected = self.detect()?;
        let total = detected.len();
        let camera = detected.into_iter().nth(index).ok_or_else(|| {
            anyhow!("device index {index} is out of range, {total} camera(s) detected")
        })?;

        debug!("opening camera {} on port {}", camera.model, camera.port);

        let descriptor = CameraDescriptor {
            model: camera.model.clone(),
            port: camera.port.clone(),
        };
        let inner = self
            .context
            .get_camera(&descriptor)
            .wait()
            .with_context(|| format!("failed to open camera {}", camera.model))?;

        Ok(OpenCamera {
            inner,
            detected: camera,
        })
    }
}

/// An opened camera connection.
pub struct OpenCamera {
    inner: gphoto2::Camera,
    detected: DetectedCamera,
}

impl OpenCamera {
    pub fn model(&self) -> &str {
        &self.detected.model
    }

    pub fn port(&self) -> &str {
        &self.detected.port
    }

    /// Free-form driver summary text.
    pub fn summary(&self) -> Result<String> {
        let summary = self
            .inner
            .summary()
            .wait()
            .context("failed to read camera summary")?;
        Ok(summary.to_string())
    }

    pub fn storages(&self) -> Result<Vec<StorageReport>> {
        let storages = self
            .inner
            .storages()
            .wait()
            .context("failed to read storage info")?;

        Ok(storages
            .iter()
            .map(|storage| StorageReport {
                label: storage.label().map(|v| v.into_owned()),
                base_dir: storage.base_directory().map(|v| v.into_owned()),
                description: storage.description().map(|v| v.into_owned()),
                capacity_kb: storage.capacity(),
                free_kb: storage.free(),
            })
            .collect())
    }
}

impl DeviceFiles for OpenCamera {
    fn files_in(&self, folder: &str) -> Result<Vec<String>> {
        trace!("listing files in {folder}");
        let files = self
            .inner
            .fs()
            .list_files(folder)
            .wait()
            .with_context(|| format!("failed to list files in {folder}"))?;
        Ok(files.collect())
    }

    fn folders_in(&self, folder: &str) -> Result<Vec<String>> {
        trace!("listing folders in {folder}");
        let folders = self
            .inner
            .fs()
            .list_folders(folder)
            .wait()
            .with_context(|| format!("failed to list folders in {folder}"))?;
        Ok(folders.collect())
    }

    fn fetch(&self, folder: &str, name: &str, dest: &Path) -> Result<()> {
        trace!("downloading {folder}/{name} to {}", dest.display());
        self.inner
            .fs()
            .download_to(folder, name, dest)
            .wait()
            .with_context(|| format!("failed to download {name} from {folder}"))?;
        Ok(())
    }
}
