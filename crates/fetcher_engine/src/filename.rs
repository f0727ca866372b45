use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

/// Extensions accepted on a filename taken from the URL.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];
const DEFAULT_EXTENSION: &str = "jpg";
const GENERATED_PREFIX: &str = "ubuntu_image_";
/// Leaves room for a `_N` conflict suffix under the usual 255-byte limit.
const MAX_NAME_LEN: usize = 240;

/// Source of the unix timestamp used in generated names.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Chooses where a downloaded image lands inside the storage directory.
#[derive(Clone)]
pub struct FilenameResolver {
    dir: PathBuf,
    clock: Clock,
}

impl FilenameResolver {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            clock: Arc::new(|| Utc::now().timestamp()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Safe filename for `url`, before checking what is already on disk.
    pub fn candidate_name(&self, url: &str, content_type: Option<&str>) -> String {
        filename_from_url(url).unwrap_or_else(|| {
            format!(
                "{GENERATED_PREFIX}{}.{}",
                (self.clock)(),
                extension_for_content_type(content_type)
            )
        })
    }

    /// Safe filename for `url` that does not collide with an existing entry.
    ///
    /// Returns the chosen name and its full path inside the storage directory.
    pub fn resolve(
        &self,
        url: &str,
        content_type: Option<&str>,
    ) -> io::Result<(String, PathBuf)> {
        let name = self.candidate_name(url, content_type);
        first_free_name(&self.dir, &name)
    }
}

/// Sanitized image filename from the last path segment of `url`, if usable.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?;
    let decoded = urlencoding::decode(segment)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let name = sanitize_filename(&decoded);
    has_image_extension(&name).then_some(name)
}

/// Reduces `input` to a bare filename made of `[A-Za-z0-9._-]`.
///
/// Only the last path component survives, `.`/`..` components are dropped,
/// leading and trailing dots are trimmed. May return an empty string.
pub fn sanitize_filename(input: &str) -> String {
    let last = input
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .last()
        .unwrap_or("");

    let kept: String = last
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = kept.trim_matches('.');

    if trimmed.len() <= MAX_NAME_LEN {
        return trimmed.to_string();
    }
    // ASCII only from here, so byte slicing is safe.
    match trimmed.rsplit_once('.') {
        Some((stem, ext)) if ext.len() < 16 => {
            let keep = MAX_NAME_LEN.saturating_sub(ext.len() + 1);
            format!("{}.{}", &stem[..keep.min(stem.len())], ext)
        }
        _ => trimmed[..MAX_NAME_LEN].to_string(),
    }
}

/// File extension (without dot) for a response content type.
pub fn extension_for_content_type(content_type: Option<&str>) -> &'static str {
    let Some(content_type) = content_type else {
        return DEFAULT_EXTENSION;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" | "image/x-ms-bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/svg+xml" => "svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "image/avif" => "avif",
        _ => DEFAULT_EXTENSION,
    }
}

fn has_image_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
        }
        None => false,
    }
}

/// `name`, or `stem_N.ext` for the smallest free N.
///
/// Tries at most one more suffix than there are entries in `dir`, so it
/// always terminates.
fn first_free_name(dir: &Path, name: &str) -> io::Result<(String, PathBuf)> {
    let path = dir.join(name);
    if !is_taken(&path) {
        return Ok((name.to_string(), path));
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name, String::new()),
    };
    let limit = fs::read_dir(dir)?.count() + 1;
    for n in 1..=limit {
        let candidate = format!("{stem}_{n}{ext}");
        let path = dir.join(&candidate);
        if !is_taken(&path) {
            return Ok((candidate, path));
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free filename for {name} in {}", dir.display()),
    ))
}

fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
