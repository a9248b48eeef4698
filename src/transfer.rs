//! Decides what to copy off the device and runs the copies.

use crate::device::DeviceFiles;
use crate::path;

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A single file queued for download, with the local directory it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub folder: String,
    pub name: String,
    pub dest: PathBuf,
}

impl FileTask {
    pub fn source(&self) -> String {
        path::join(&self.folder, &self.name)
    }

    pub fn target(&self) -> PathBuf {
        self.dest.join(&self.name)
    }
}

/// What to copy, plus how much enumeration left out.
#[derive(Debug, Default)]
pub struct DownloadPlan {
    pub tasks: Vec<FileTask>,
    pub skipped: usize,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Copies `source` (a file or a folder on the device) into `dest_dir`.
///
/// A bare path can name either a folder or a file; the parent listing
/// decides which, the way the device sees it.
pub fn download<D: DeviceFiles>(
    device: &D,
    source: &str,
    dest_dir: &Path,
    recursive: bool,
    skip_existing: bool,
) -> Result<Outcome> {
    if !dest_dir.is_dir() {
        bail!("destination folder {} does not exist", dest_dir.display());
    }

    let source = path::normalize(source);

    let Some((parent, name)) = path::split(&source) else {
        // Trailing slash or root, only a folder can be meant.
        let folder = path::normalize_folder(&source);
        return download_folder(device, &folder, dest_dir, recursive, skip_existing);
    };

    if device.folders_in(parent)?.iter().any(|f| f == name) {
        return download_folder(device, &source, dest_dir, recursive, skip_existing);
    }

    if !device.files_in(parent)?.iter().any(|f| f == name) {
        bail!("no file or folder {source} on the device");
    }

    let task = FileTask {
        folder: parent.to_string(),
        name: name.to_string(),
        dest: dest_dir.to_path_buf(),
    };
    let mut outcome = Outcome::default();
    fetch_task(device, &task, skip_existing, &mut outcome);
    Ok(outcome)
}

fn download_folder<D: DeviceFiles>(
    device: &D,
    folder: &str,
    dest_dir: &Path,
    recursive: bool,
    skip_existing: bool,
) -> Result<Outcome> {
    info!("enumerating files under {folder}");

    let mut plan = DownloadPlan::default();
    enumerate_into(device, folder, dest_dir, recursive, skip_existing, &mut plan)?;
    print_enumerating(plan.tasks.len(), true);

    run_plan(device, &plan, skip_existing)
}

/// Walks `folder`, appending one task per file. Each subfolder mirrors to
/// `dest/<subfolder>`.
fn enumerate_into<D: DeviceFiles>(
    device: &D,
    folder: &str,
    dest: &Path,
    recursive: bool,
    skip_existing: bool,
    plan: &mut DownloadPlan,
) -> Result<()> {
    for name in device.files_in(folder)? {
        if skip_existing && dest.join(&name).exists() {
            debug!("already have {}, leaving it out", path::join(folder, &name));
            plan.skipped += 1;
            continue;
        }

        plan.tasks.push(FileTask {
            folder: folder.to_string(),
            name,
            dest: dest.to_path_buf(),
        });
    }

    print_enumerating(plan.tasks.len(), false);

    if recursive {
        for sub in device.folders_in(folder)? {
            enumerate_into(
                device,
                &path::join(folder, &sub),
                &dest.join(&sub),
                recursive,
                skip_existing,
                plan,
            )?;
        }
    }
    Ok(())
}

fn run_plan<D: DeviceFiles>(device: &D, plan: &DownloadPlan, skip_existing: bool) -> Result<Outcome> {
    let total = plan.tasks.len();
    let mut outcome = Outcome {
        skipped: plan.skipped,
        ..Default::default()
    };

    for (i, task) in plan.tasks.iter().enumerate() {
        if !task.dest.exists() {
            fs::create_dir_all(&task.dest)
                .with_context(|| format!("failed to create {}", task.dest.display()))?;
        }

        print!("[{}/{}]: ", i + 1, total);
        fetch_task(device, task, skip_existing, &mut outcome);
    }

    Ok(outcome)
}

/// Downloads one file, reporting the result on the progress line. Transfer
/// errors are recorded, not propagated, so one bad file does not end the
/// batch.
fn fetch_task<D: DeviceFiles>(
    device: &D,
    task: &FileTask,
    skip_existing: bool,
    outcome: &mut Outcome,
) {
    print!("Downloading {}... ", task.source());
    io::stdout().flush().ok();

    let target = task.target();
    if target.exists() {
        if skip_existing {
            println!("SKIPPED");
            outcome.skipped += 1;
            return;
        }

        // The device library refuses to write onto an existing file.
        if let Err(e) = fs::remove_file(&target) {
            println!("FAILED");
            warn!("could not replace {}: {e}", target.display());
            outcome.failed += 1;
            return;
        }
    }

    match device.fetch(&task.folder, &task.name, &target) {
        Ok(()) => {
            println!("DONE");
            outcome.downloaded += 1;
        }
        Err(e) => {
            println!("FAILED");
            warn!("download of {} failed: {e:#}", task.source());
            outcome.failed += 1;
        }
    }
}

fn print_enumerating(count: usize, done: bool) {
    print!("\rEnumerating files: {count}");
    io::stdout().flush().ok();
    if done {
        println!();
    }
}
