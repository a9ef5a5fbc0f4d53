//! Binary Fetcher: downloads pinned external tool binaries (terraform,
//! terragrunt) and installs them, executable, under the workspace `bin/`
//! directory.

use std::io::Read as _;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::model::Binary;

/// Drives the download of a single [`Binary`] into a workspace `bin/` dir.
pub struct BinaryFetcher<'a> {
    binary: &'a Binary,
    root: PathBuf,
}

impl<'a> BinaryFetcher<'a> {
    pub fn new(binary: &'a Binary, root: impl Into<PathBuf>) -> Self {
        Self {
            binary,
            root: root.into(),
        }
    }

    /// Absolute path the binary will be installed to.
    pub fn abspath(&self) -> PathBuf {
        self.root.join("bin").join(&self.binary.binary)
    }

    /// Download and install the binary, setting the executable bit.
    pub async fn download(&self) -> CoreResult<PathBuf> {
        let url = self.binary.url.replace("{version}", &self.binary.version);
        let started = std::time::Instant::now();

        info!(binary = %self.binary.binary, %url, "downloading binary");
        let response = reqwest::get(&url).await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let content = match &self.binary.extract {
            Some(member) => extract_from_zip(&bytes, member).map_err(|e| CoreError::BinaryDownloadFailed {
                binary: self.binary.binary.clone(),
                message: e.to_string(),
            })?,
            None => bytes.to_vec(),
        };

        let dest = self.abspath();
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, &content)?;
        set_executable(&dest)?;

        info!(
            binary = %self.binary.binary,
            bytes = content.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "binary installed"
        );

        Ok(dest)
    }
}

fn extract_from_zip(bytes: &[u8], member: &str) -> Result<Vec<u8>, zip::result::ZipError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)?;
    let mut file = archive.by_name(member)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> CoreResult<()> {
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> CoreResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abspath_is_rooted_under_bin() {
        let binary = Binary {
            binary: "terraform".to_string(),
            url: "https://example.com/{version}.zip".to_string(),
            extract: Some("terraform".to_string()),
            version: "1.4.4".to_string(),
        };
        let fetcher = BinaryFetcher::new(&binary, "/workspace");
        assert_eq!(fetcher.abspath(), PathBuf::from("/workspace/bin/terraform"));
    }

    #[test]
    fn extract_from_zip_reads_named_member() {
        let mut buf = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buf);
            let mut writer = zip::ZipWriter::new(cursor);
            writer
                .start_file::<_, ()>("terraform", zip::write::FileOptions::default())
                .unwrap();
            std::io::Write::write_all(&mut writer, b"binary-contents").unwrap();
            writer.finish().unwrap();
        }

        let extracted = extract_from_zip(&buf, "terraform").unwrap();
        assert_eq!(extracted, b"binary-contents");
    }
}
