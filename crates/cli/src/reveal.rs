use dirlens_protocol::RevealOutcome;
use std::io;
use std::process::Command;

/// Shows a path in the platform file manager.
pub trait FileManager: Send + Sync {
    fn reveal(&self, path: &str) -> io::Result<RevealOutcome>;
}

/// Launches the native file manager where one is known.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileManager;

impl FileManager for SystemFileManager {
    fn reveal(&self, path: &str) -> io::Result<RevealOutcome> {
        if cfg!(windows) {
            // explorer reports a non-zero exit status even when it succeeds
            Command::new("explorer")
                .arg(format!("/select,{}", path.replace('"', "")))
                .status()?;
            Ok(RevealOutcome::Revealed)
        } else if cfg!(target_os = "macos") {
            let status = Command::new("open").arg("-R").arg(path).status()?;
            if status.success() {
                Ok(RevealOutcome::Revealed)
            } else {
                Err(io::Error::other(format!("open -R exited with {status}")))
            }
        } else {
            Ok(RevealOutcome::Unsupported)
        }
    }
}
