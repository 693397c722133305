//! Debug logging to a file.
//!
//! The terminal belongs to the meter, so diagnostics go to
//! `/tmp/<client name>.log` and only when `--debug` is given. The file is
//! created owner read/write only since it names audio devices.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "/tmp";
const LOG_MODE: u32 = 0o600;
const DEFAULT_FILTER: &str = "k20=debug";

/// Log file path for a client name, with unsafe path characters replaced
pub fn log_path(client_name: &str) -> PathBuf {
    let safe: String = client_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_start_matches('.');
    let stem = if safe.is_empty() { "k20" } else { safe };
    PathBuf::from(LOG_DIR).join(format!("{stem}.log"))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    // Exclusive create first, otherwise truncate the user's existing file in
    // place. A symlink planted at the path is refused, never followed.
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(LOG_MODE)
        .open(path)
        .or_else(|_| {
            let file = OpenOptions::new()
                .write(true)
                .custom_flags(libc::O_NOFOLLOW)
                .open(path)?;
            if !file.metadata()?.is_file() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} is not a regular file", path.display()),
                ));
            }
            file.set_len(0)?;
            Ok(file)
        })
}

/// Install the global subscriber when debugging is enabled.
pub fn init(debug: bool, client_name: &str) -> io::Result<Option<PathBuf>> {
    if !debug {
        return Ok(None);
    }

    let path = log_path(client_name);
    let file = open_log_file(&path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::{log_path, open_log_file};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    #[test]
    fn log_path_uses_client_name() {
        assert_eq!(log_path("k20"), PathBuf::from("/tmp/k20.log"));
        assert_eq!(log_path("mix-bus_2"), PathBuf::from("/tmp/mix-bus_2.log"));
    }

    #[test]
    fn log_path_stays_inside_log_dir() {
        assert_eq!(log_path("../etc/x"), PathBuf::from("/tmp/_etc_x.log"));
        assert_eq!(log_path(""), PathBuf::from("/tmp/k20.log"));
        assert_eq!(log_path("a b"), PathBuf::from("/tmp/a_b.log"));
    }

    #[test]
    fn new_log_is_private() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k20.log");
        open_log_file(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn existing_log_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k20.log");
        fs::write(&path, "previous run\n").unwrap();
        open_log_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn symlinked_log_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("precious");
        fs::write(&target, "keep me").unwrap();
        let link = dir.path().join("k20.log");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(open_log_file(&link).is_err());
        assert_eq!(fs::read_to_string(&target).unwrap(), "keep me");
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        assert_eq!(super::init(false, "k20").unwrap(), None);
    }
}
