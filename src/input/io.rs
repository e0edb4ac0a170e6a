use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use memmap2::Mmap;

use crate::input::InputError;

/// Raw artifact contents: mapped from disk when plain, inflated when gzip.
pub enum ArtifactBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for ArtifactBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ArtifactBytes::Mapped(m) => &m[..],
            ArtifactBytes::Owned(v) => v.as_slice(),
        }
    }
}

pub fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

pub fn read_artifact(path: &Path) -> Result<ArtifactBytes, InputError> {
    let file = File::open(path)?;
    if is_gz(path) {
        let mut decoder = MultiGzDecoder::new(file);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| InputError::InvalidInput(format!(
                "failed to decompress {}: {e}",
                path.display()
            )))?;
        return Ok(ArtifactBytes::Owned(out));
    }
    if file.metadata()?.len() == 0 {
        // zero-length files cannot be mapped on every platform
        return Ok(ArtifactBytes::Owned(Vec::new()));
    }
    // SAFETY: artifacts are read-only inputs that are not modified during a run.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(ArtifactBytes::Mapped(mmap))
}

pub fn read_text(path: &Path) -> Result<String, InputError> {
    let bytes = read_artifact(path)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| InputError::Parse {
        path: path.to_path_buf(),
        line: 0,
        message: "file is not valid UTF-8".to_string(),
    })
}

/// Maps a header line to the column index of each required name.
pub fn header_columns(
    path: &Path,
    header: &str,
    required: &[&str],
) -> Result<Vec<usize>, InputError> {
    let cols: Vec<String> = header
        .split('\t')
        .map(|s| s.trim().to_ascii_lowercase())
        .collect();
    let mut out = Vec::with_capacity(required.len());
    for name in required {
        match cols.iter().position(|c| c == name) {
            Some(idx) => out.push(idx),
            None => {
                return Err(InputError::Parse {
                    path: path.to_path_buf(),
                    line: 1,
                    message: format!("missing column '{name}' in header"),
                });
            }
        }
    }
    Ok(out)
}
