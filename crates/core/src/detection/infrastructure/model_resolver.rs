use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::APP_DIR_NAME;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("failed to create cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Finds model files on disk, downloading them into the cache when absent.
#[derive(Clone, Debug)]
pub struct ModelResolver {
    cache_dir: PathBuf,
    bundled_dir: Option<PathBuf>,
}

impl ModelResolver {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            bundled_dir: None,
        }
    }

    /// Resolver over the platform cache directory.
    ///
    /// - macOS: `~/Library/Application Support/FaceCheck/models/`
    /// - Linux: `$XDG_CACHE_HOME/FaceCheck/models/` or `~/.cache/FaceCheck/models/`
    /// - Windows: `%LOCALAPPDATA%/FaceCheck/models/`
    pub fn platform() -> Result<Self, ModelResolveError> {
        #[cfg(target_os = "macos")]
        let base = dirs::data_dir();
        #[cfg(not(target_os = "macos"))]
        let base = dirs::cache_dir();

        base.map(|dir| Self::new(dir.join(APP_DIR_NAME).join("models")))
            .ok_or(ModelResolveError::NoCacheDir)
    }

    /// Also look in `dir` for pre-packaged models.
    pub fn with_bundled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_dir = Some(dir.into());
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path to model `name`, looking in order at the explicit path, the
    /// cache, the bundled directory, and finally downloading `url`.
    pub fn resolve(
        &self,
        name: &str,
        url: &str,
        explicit: Option<&Path>,
        progress: Option<ProgressFn>,
    ) -> Result<PathBuf, ModelResolveError> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            log::warn!("Model {} not found, falling back to {name}", path.display());
        }

        let cached = self.cache_dir.join(name);
        if cached.is_file() {
            return Ok(cached);
        }
        if let Some(bundled) = self
            .bundled_dir
            .as_ref()
            .map(|dir| dir.join(name))
            .filter(|path| path.is_file())
        {
            return Ok(bundled);
        }

        log::info!("Downloading {name} from {url}");
        fs::create_dir_all(&self.cache_dir).map_err(|source| ModelResolveError::CacheDir {
            path: self.cache_dir.clone(),
            source,
        })?;
        download(url, &cached, progress)?;
        Ok(cached)
    }
}

/// Streams `url` into `<dest>.part`, then renames it over `dest`. The
/// partial file is removed on failure.
fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let partial = dest.with_extension("part");
    let result = fetch_into(url, &partial, progress).and_then(|()| {
        fs::rename(&partial, dest).map_err(|source| ModelResolveError::Write {
            path: dest.to_path_buf(),
            source,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn fetch_into(url: &str, path: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|source| ModelResolveError::Download {
            url: url.to_string(),
            source,
        })?;
    let total = response.content_length().unwrap_or(0);

    let write_err = |source| ModelResolveError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::create(path).map_err(write_err)?;
    let mut writer = ProgressWriter::new(io::BufWriter::new(file), total, progress);
    io::copy(&mut response, &mut writer).map_err(write_err)?;
    writer.flush().map_err(write_err)
}

/// Reports cumulative bytes written to a callback.
struct ProgressWriter<W> {
    inner: W,
    written: u64,
    total: u64,
    progress: Option<ProgressFn>,
}

impl<W: Write> ProgressWriter<W> {
    fn new(inner: W, total: u64, progress: Option<ProgressFn>) -> Self {
        Self {
            inner,
            written: 0,
            total,
            progress,
        }
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        if let Some(callback) = &self.progress {
            callback(self.written, self.total);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
