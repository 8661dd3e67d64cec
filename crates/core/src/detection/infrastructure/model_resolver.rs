use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{
    BLAZEFACE_MODEL_URL, BUNDLED_MODELS_DIR, MODEL_DIR_ENV, MODEL_URL_ENV,
};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
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
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error(
        "face detection model {name} not found in {searched:?}; \
         place it there, set {dir_env}, or set {url_env} (at build or run time) \
         to download it",
        dir_env = MODEL_DIR_ENV,
        url_env = MODEL_URL_ENV
    )]
    NotFound { name: String, searched: Vec<PathBuf> },
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where to look for a model besides the user cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelSource {
    pub bundled_dir: Option<PathBuf>,
    pub url: Option<String>,
}

impl ModelSource {
    /// Reads the bundled directory and download URL from the environment.
    ///
    /// Without `FACEBLUR_MODEL_DIR` the `models/` directory beside the
    /// executable is searched; without a runtime `FACEBLUR_MODEL_URL` the
    /// URL pinned at build time is used.
    pub fn from_env() -> Self {
        let exe_models = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(BUNDLED_MODELS_DIR)));
        Self::with_defaults(
            std::env::var_os(MODEL_DIR_ENV).map(PathBuf::from),
            std::env::var(MODEL_URL_ENV).ok(),
            exe_models,
            BLAZEFACE_MODEL_URL,
        )
    }

    fn with_defaults(
        dir: Option<PathBuf>,
        url: Option<String>,
        default_dir: Option<PathBuf>,
        default_url: Option<&str>,
    ) -> Self {
        let non_empty = |u: &str| !u.trim().is_empty();
        Self {
            bundled_dir: dir.filter(|d| !d.as_os_str().is_empty()).or(default_dir),
            url: url
                .filter(|u| non_empty(u))
                .or_else(|| default_url.filter(|u| non_empty(u)).map(str::to_string)),
        }
    }
}

/// Resolve a model file by name.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled directory, when configured
/// 3. Download from the configured URL into the cache
pub fn resolve(
    name: &str,
    source: &ModelSource,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir()?;
    resolve_in(&cache_dir, name, source, progress)
}

fn resolve_in(
    cache_dir: &Path,
    name: &str,
    source: &ModelSource,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    let mut searched = vec![cached_path.clone()];
    if let Some(dir) = &source.bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            return Ok(bundled_path);
        }
        searched.push(bundled_path);
    }

    let Some(url) = &source.url else {
        return Err(ModelResolveError::NotFound {
            name: name.to_string(),
            searched,
        });
    };

    log::info!("Downloading {name} from {url}");
    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/FaceBlur/models/`
/// - Linux: `$XDG_CACHE_HOME/FaceBlur/models/` or `~/.cache/FaceBlur/models/`
/// - Windows: `%LOCALAPPDATA%/FaceBlur/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join("FaceBlur").join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);

    // Never leave a truncated .part file behind.
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);

    let mut file = fs::File::create(temp_path).map_err(write_err(temp_path))?;

    let mut downloaded: u64 = 0;
    let mut buf = vec![0u8; 256 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_err(temp_path))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err(temp_path))?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(write_err(temp_path))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(write_err(dest))?;
    Ok(())
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> ModelResolveError {
    let path = path.to_path_buf();
    move |source| ModelResolveError::Write { path, source }
}
