//! Static viewer assets published next to the log.
//!
//! The page decrypts entries in the browser with WebCrypto, so it must stay in
//! step with the blob format in `witness-codec`. `.nojekyll` stops GitHub
//! Pages from running the directory through Jekyll.

use std::{
    fs,
    path::{Path, PathBuf},
};

use witness_contracts::error::{WitnessError, WitnessResult};

pub const VIEWER_HTML: &str = include_str!("../assets/viewer.html");
pub const VIEWER_FILE: &str = "index.html";
pub const NOJEKYLL_FILE: &str = ".nojekyll";

/// Write the viewer assets into `workdir`, returning their relative paths.
pub fn publish(workdir: &Path) -> WitnessResult<Vec<PathBuf>> {
    let assets: [(&str, &[u8]); 2] = [(VIEWER_FILE, VIEWER_HTML.as_bytes()), (NOJEKYLL_FILE, b"")];

    let mut written = Vec::with_capacity(assets.len());
    for (name, contents) in assets {
        let path = workdir.join(name);
        fs::write(&path, contents).map_err(|e| WitnessError::StoreError {
            reason: format!("failed to write viewer asset '{}': {}", path.display(), e),
        })?;
        written.push(PathBuf::from(name));
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_viewer_and_empty_marker() {
        let dir = tempfile::tempdir().unwrap();
        let paths = publish(dir.path()).unwrap();

        assert_eq!(paths, vec![PathBuf::from("index.html"), PathBuf::from(".nojekyll")]);
        assert_eq!(fs::read_to_string(dir.path().join("index.html")).unwrap(), VIEWER_HTML);
        assert_eq!(fs::metadata(dir.path().join(".nojekyll")).unwrap().len(), 0);
    }

    #[test]
    fn viewer_matches_codec_parameters() {
        assert!(VIEWER_HTML.contains(&format!("ROUNDS = {}", witness_codec::PBKDF2_ROUNDS)));
        assert!(VIEWER_HTML.contains("AES-GCM"));
        assert!(VIEWER_HTML.contains("SHA-256"));
    }
}
