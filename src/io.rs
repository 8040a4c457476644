use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use fs2::FileExt;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::UpdateError;

pub const HASH_HEX_LEN: usize = 16;

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn content_hash(bytes: &[u8]) -> String {
    let full_hex = blake3::hash(bytes).to_hex().to_string();
    full_hex[..HASH_HEX_LEN].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PathFingerprint {
    #[cfg(unix)]
    device: u64,
    #[cfg(unix)]
    inode: u64,
    length: u64,
    modified_nanos: Option<u128>,
}

/// State captured when a script was read; a rewrite only goes through if the file still
/// matches it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WriteGuard {
    fingerprint: PathFingerprint,
    source_hash: String,
}

#[derive(Debug, Clone)]
pub struct ScriptInput {
    path: Option<PathBuf>,
    text: String,
    guard: Option<WriteGuard>,
}

impl ScriptInput {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            path: None,
            text: text.into(),
            guard: None,
        }
    }

    /// `None` for stdin.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_hash(&self) -> String {
        self.guard
            .as_ref()
            .map_or_else(|| content_hash(self.text.as_bytes()), |guard| guard.source_hash.clone())
    }

    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "-".to_string(), |path| path.display().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Expands `patterns` into file paths, in argument order. Patterns without glob
/// metacharacters are taken literally so a missing file surfaces as an io error on read.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>, UpdateError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            push_unique(&mut paths, PathBuf::from(pattern));
            continue;
        }

        let entries = glob::glob(pattern).map_err(|error| UpdateError::InvalidGlob {
            pattern: pattern.clone(),
            message: error.msg.to_string(),
        })?;
        let mut matched = 0usize;
        for entry in entries {
            let path = entry.map_err(|error| {
                let path = error.path().to_path_buf();
                UpdateError::io(&path, error.into_error())
            })?;
            if path.is_file() {
                matched += 1;
                push_unique(&mut paths, path);
            }
        }
        if matched == 0 {
            warn!(pattern = %pattern, "input pattern matched no files");
        }
    }

    if paths.is_empty() {
        return Err(UpdateError::InvalidRequest {
            message: "No input files matched the given patterns".to_string(),
        });
    }
    Ok(paths)
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

/// Reads every input named by `patterns`, or stdin when there are none.
pub fn read_inputs(patterns: &[String]) -> Result<Vec<ScriptInput>, UpdateError> {
    if patterns.is_empty() {
        return Ok(vec![read_stdin()?]);
    }
    expand_inputs(patterns)?
        .iter()
        .map(|path| read_script(path))
        .collect()
}

pub fn read_stdin() -> Result<ScriptInput, UpdateError> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|error| UpdateError::StdinRead { source: error })?;
    Ok(ScriptInput::from_text(text))
}

pub fn read_script(path: &Path) -> Result<ScriptInput, UpdateError> {
    let fingerprint = capture_path_fingerprint(path)?;
    let bytes = fs::read(path).map_err(|error| UpdateError::io(path, error))?;
    let source_hash = content_hash(&bytes);
    let text = String::from_utf8(bytes).map_err(|error| {
        UpdateError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, error),
        )
    })?;

    Ok(ScriptInput {
        path: Some(path.to_path_buf()),
        text,
        guard: Some(WriteGuard {
            fingerprint,
            source_hash,
        }),
    })
}

/// Replaces the file `input` was read from with `contents`. Nothing is written when the
/// contents are unchanged.
pub fn write_script(input: &ScriptInput, contents: &str) -> Result<WriteOutcome, UpdateError> {
    let (Some(path), Some(guard)) = (input.path(), input.guard.as_ref()) else {
        return Err(UpdateError::InvalidRequest {
            message: "Input read from stdin cannot be rewritten in place; pass FILE arguments"
                .to_string(),
        });
    };

    refuse_symlink(path)?;
    if contents == input.text {
        return Ok(WriteOutcome::Unchanged);
    }

    let _lock = acquire_write_lock(path)?;
    verify_write_guard(path, guard)?;
    write_text_atomically(path, contents, guard)?;
    info!(path = %path.display(), "script rewritten");
    Ok(WriteOutcome::Written)
}

#[derive(Debug)]
struct WriteLock {
    _file: File,
}

fn acquire_write_lock(path: &Path) -> Result<WriteLock, UpdateError> {
    let file = OpenOptions::new()
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
        .map_err(|error| UpdateError::io(path, error))?;

    file.try_lock_exclusive().map_err(|error| {
        if error.kind() == std::io::ErrorKind::WouldBlock {
            UpdateError::ResourceBusy {
                path: path.display().to_string(),
            }
        } else {
            UpdateError::io(path, error)
        }
    })?;

    Ok(WriteLock { _file: file })
}

fn refuse_symlink(path: &Path) -> Result<(), UpdateError> {
    let metadata = fs::symlink_metadata(path).map_err(|error| UpdateError::io(path, error))?;
    if metadata.file_type().is_symlink() {
        return Err(UpdateError::InvalidRequest {
            message: format!("Refusing to rewrite through symbolic link '{}'", path.display()),
        });
    }
    Ok(())
}

fn capture_path_fingerprint(path: &Path) -> Result<PathFingerprint, UpdateError> {
    let metadata = fs::symlink_metadata(path).map_err(|error| UpdateError::io(path, error))?;
    let modified_nanos = metadata
        .modified()
        .ok()
        .and_then(|timestamp| timestamp.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_nanos());

    Ok(PathFingerprint {
        #[cfg(unix)]
        device: metadata.dev(),
        #[cfg(unix)]
        inode: metadata.ino(),
        length: metadata.len(),
        modified_nanos,
    })
}

fn verify_write_guard(path: &Path, expected: &WriteGuard) -> Result<(), UpdateError> {
    if capture_path_fingerprint(path)? != expected.fingerprint {
        return Err(UpdateError::PathChanged {
            path: path.display().to_string(),
        });
    }

    let current_bytes = fs::read(path).map_err(|error| UpdateError::io(path, error))?;
    let current_hash = content_hash(&current_bytes);
    if current_hash != expected.source_hash {
        return Err(UpdateError::PreconditionFailed {
            expected_hash: expected.source_hash.clone(),
            actual_hash: current_hash,
        });
    }
    Ok(())
}

fn write_text_atomically(path: &Path, contents: &str, guard: &WriteGuard) -> Result<(), UpdateError> {
    let target_permissions = fs::metadata(path)
        .map_err(|error| UpdateError::io(path, error))?
        .permissions();
    let (temp_path, mut temp_file) = create_temp_file_adjacent(path)?;

    let result = (|| {
        temp_file
            .write_all(contents.as_bytes())
            .map_err(|error| UpdateError::io(&temp_path, error))?;
        temp_file
            .sync_all()
            .map_err(|error| UpdateError::io(&temp_path, error))?;

        // the file may have changed while the temp copy was written
        verify_write_guard(path, guard)?;

        fs::set_permissions(&temp_path, target_permissions.clone())
            .map_err(|error| UpdateError::io(&temp_path, error))?;
        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|error| UpdateError::io(path, error))?;
        sync_parent_directory(path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn create_temp_file_adjacent(path: &Path) -> Result<(PathBuf, File), UpdateError> {
    let parent = resolve_parent_directory(path);
    let file_name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("script");

    for _ in 0..64 {
        let counter = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos());
        let temp_path = parent.join(format!(".{file_name}.usacloud-update-tmp-{nanos}-{counter}"));

        match OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((temp_path, file)),
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(error) => return Err(UpdateError::io(&temp_path, error)),
        }
    }

    Err(UpdateError::InvalidRequest {
        message: format!(
            "Failed to allocate an adjacent temporary file for '{}'",
            path.display()
        ),
    })
}

fn resolve_parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn sync_parent_directory(path: &Path) -> Result<(), UpdateError> {
    #[cfg(unix)]
    {
        let parent = resolve_parent_directory(path);
        let directory_handle =
            File::open(&parent).map_err(|error| UpdateError::io(&parent, error))?;
        directory_handle
            .sync_all()
            .map_err(|error| UpdateError::io(&parent, error))
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
