//! LibreOffice-backed export of office documents to PDF.
//!
//! Each export runs `soffice --headless --convert-to pdf` with its own
//! throw-away user profile, so a desktop LibreOffice session that is already
//! running does not swallow the request. The PDF lands in a temporary output
//! directory and is then moved to the requested path.

use super::OfficeExporter;
use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, error, info};

/// Interval between checks of a running LibreOffice process.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Locations checked before falling back to `PATH`.
const SOFFICE_CANDIDATES: &[&str] = &[
    // macOS
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    // Linux
    "/usr/bin/soffice",
    "/usr/lib/libreoffice/program/soffice",
    "/opt/libreoffice/program/soffice",
    // Snap (Ubuntu)
    "/snap/bin/libreoffice.soffice",
];

/// Headless LibreOffice exporter.
#[derive(Debug, Clone)]
pub struct LibreOffice {
    soffice_path: Option<PathBuf>,
    timeout: Duration,
}

impl LibreOffice {
    pub fn new(soffice_path: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            soffice_path,
            timeout,
        }
    }

    /// Find the soffice binary.
    pub fn find_soffice(&self) -> Result<PathBuf, ConvertError> {
        if let Some(ref path) = self.soffice_path {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(ConvertError::OfficeSuiteNotFound);
        }

        for candidate in SOFFICE_CANDIDATES {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Ok(path);
            }
        }

        which::which("soffice")
            .or_else(|_| which::which("libreoffice"))
            .map_err(|_| ConvertError::OfficeSuiteNotFound)
    }

    fn build_command(soffice: &Path, profile: &Path, out_dir: &Path, input: &Path) -> Command {
        let mut cmd = Command::new(soffice);
        cmd.args([
            "--headless",
            "--invisible",
            "--nologo",
            "--nofirststartwizard",
            "--norestore",
        ]);
        cmd.arg(format!("-env:UserInstallation={}", file_url(profile)));
        cmd.args(["--convert-to", "pdf", "--outdir"]);
        cmd.arg(out_dir);
        cmd.arg(input);
        cmd
    }

    /// Run `cmd` to completion or kill it once the timeout expires.
    ///
    /// stdout is discarded and stderr is drained on a reader thread, so a
    /// chatty process never blocks on a full pipe. On unix the child leads its
    /// own process group and the whole group is killed, which also reaches the
    /// `soffice.bin` spawned by the `soffice` wrapper script.
    fn run_with_timeout(&self, mut cmd: Command, input: &Path) -> Result<(), ConvertError> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|e| ConvertError::OfficeConversionFailed {
            path: input.to_path_buf(),
            message: format!("failed to start soffice: {e}"),
        })?;

        let stderr_reader = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let started = Instant::now();
        let status = loop {
            let status = child.try_wait().map_err(|e| ConvertError::Io {
                path: input.to_path_buf(),
                source: e,
            })?;
            if let Some(status) = status {
                break status;
            }
            if started.elapsed() >= self.timeout {
                kill_tree(&mut child);
                // The reader finishes on its own once every holder of the pipe is gone.
                return Err(ConvertError::OfficeTimeout {
                    path: input.to_path_buf(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            let stderr = stderr_reader
                .and_then(|handle| handle.join().ok())
                .unwrap_or_default();
            let stderr = String::from_utf8_lossy(&stderr);
            error!("LibreOffice conversion failed for {:?}: {}", input, stderr);
            return Err(ConvertError::OfficeConversionFailed {
                path: input.to_path_buf(),
                message: format!("{} {}", status, stderr.trim()),
            });
        }
        Ok(())
    }
}

/// Kill `child` and, on unix, every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pid) = i32::try_from(child.id()) {
            // SAFETY: signals the process group created for this child.
            unsafe { libc::kill(-pid, libc::SIGKILL) };
        }
    }
    // The process may exit between the check and the kill.
    let _ = child.kill();
    let _ = child.wait();
}

impl OfficeExporter for LibreOffice {
    fn export_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        if !input.exists() {
            return Err(ConvertError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        let soffice = self.find_soffice()?;
        info!("Found LibreOffice at: {:?}", soffice);

        let scratch = TempDir::with_prefix("docshift-office-")
            .map_err(|e| ConvertError::Internal(format!("tempdir: {e}")))?;
        let profile = scratch.path().join("profile");
        let out_dir = scratch.path().join("out");
        std::fs::create_dir_all(&out_dir).map_err(|e| ConvertError::Io {
            path: out_dir.clone(),
            source: e,
        })?;

        let started = Instant::now();
        let cmd = Self::build_command(&soffice, &profile, &out_dir, input);
        self.run_with_timeout(cmd, input)?;

        let produced = find_pdf(&out_dir, input).ok_or_else(|| {
            ConvertError::OfficeConversionFailed {
                path: input.to_path_buf(),
                message: "PDF output file not found".to_string(),
            }
        })?;

        move_file(&produced, output)?;
        debug!("Converted {:?} in {:?}", input.file_name(), started.elapsed());
        Ok(())
    }
}

/// Locate the PDF LibreOffice wrote into `out_dir`.
fn find_pdf(out_dir: &Path, input: &Path) -> Option<PathBuf> {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let expected = out_dir.join(format!("{stem}.pdf"));
    if expected.exists() {
        return Some(expected);
    }

    // LibreOffice may have created a file with a slightly different name.
    std::fs::read_dir(out_dir).ok().and_then(|entries| {
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| p.extension().map(|ext| ext == "pdf").unwrap_or(false))
    })
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> Result<(), ConvertError> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(|e| ConvertError::output(to, e))?;
    let _ = std::fs::remove_file(from);
    Ok(())
}

/// `file://` URL for a local directory, as LibreOffice expects.
fn file_url(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    if s.starts_with('/') {
        format!("file://{s}")
    } else {
        format!("file:///{s}")
    }
}
