use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fetcher_logging::{fetcher_debug, fetcher_info, fetcher_warn};
use thiserror::Error;

/// Ledger file kept next to the saved images.
pub const LEDGER_FILENAME: &str = ".image_hashes.txt";

const HASH_HEX_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("could not append to ledger {path:?}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Append-only set of content hashes for images already saved.
///
/// Backed by a text file holding one lowercase hex hash per line.
#[derive(Debug)]
pub struct HashLedger {
    path: PathBuf,
    hashes: HashSet<String>,
}

impl HashLedger {
    /// Loads the ledger at `path`; a missing file yields an empty ledger.
    ///
    /// Malformed lines are skipped. An unreadable file is logged and treated
    /// as empty so that fetching can continue.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fetcher_debug!("No ledger at {:?}; starting empty", path);
                return Self::empty(path);
            }
            Err(err) => {
                fetcher_warn!("Failed to read ledger {:?}: {}", path, err);
                return Self::empty(path);
            }
        };

        let mut hashes = HashSet::new();
        let mut skipped = 0usize;
        for line in String::from_utf8_lossy(&content).lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match normalize_hash(line) {
                Some(hash) => {
                    hashes.insert(hash);
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            fetcher_warn!("Skipped {} malformed ledger lines in {:?}", skipped, path);
        }
        fetcher_info!("Loaded {} existing image hashes from {:?}", hashes.len(), path);
        Self { path, hashes }
    }

    /// Loads the ledger kept inside `storage_dir`.
    pub fn load_in(storage_dir: &Path) -> Self {
        Self::load(storage_dir.join(LEDGER_FILENAME))
    }

    fn empty(path: PathBuf) -> Self {
        Self {
            path,
            hashes: HashSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.contains(&hash.to_ascii_lowercase())
    }

    /// Records `hash` on disk, then in memory.
    ///
    /// Appending a hash that is already present is a no-op. On failure the
    /// in-memory set is left as it was.
    pub fn append(&mut self, hash: &str) -> Result<(), LedgerError> {
        let hash = hash.to_ascii_lowercase();
        if self.hashes.contains(&hash) {
            return Ok(());
        }

        self.write_line(&hash).map_err(|source| LedgerError::Append {
            path: self.path.clone(),
            source,
        })?;
        self.hashes.insert(hash);
        Ok(())
    }

    fn write_line(&self, hash: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut line = String::with_capacity(hash.len() + 2);
        if !ends_with_newline(&mut file)? {
            line.push('\n');
        }
        line.push_str(hash);
        line.push('\n');

        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

/// True for an empty file or one whose last byte is a line feed.
fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn normalize_hash(line: &str) -> Option<String> {
    if line.len() == HASH_HEX_LEN && line.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(line.to_ascii_lowercase())
    } else {
        None
    }
}
