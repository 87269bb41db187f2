use anyhow::{Context, Result};
use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

pub const CONTROL_BUFFER_SIZE: usize = 128;

pub fn create_named_pipe(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed stale file at {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to remove {}", path.display()));
        }
    }

    let c_path = CString::new(path.as_os_str().as_bytes())
        .with_context(|| format!("Invalid pipe path: {}", path.display()))?;

    // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
    if rc != 0 {
        return Err(io::Error::last_os_error())
            .with_context(|| format!("Failed to create named pipe at {}", path.display()));
    }

    info!("Created named pipe {}", path.display());
    Ok(())
}

pub fn is_named_pipe(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.file_type().is_fifo())
        .unwrap_or(false)
}

pub async fn write_message(path: &Path, message: &str) -> io::Result<()> {
    let mut pipe = OpenOptions::new().write(true).open(path).await?;
    pipe.write_all(message.as_bytes()).await?;
    pipe.flush().await?;
    Ok(())
}

pub async fn read_message(path: &Path, limit: usize) -> io::Result<String> {
    let mut pipe = File::open(path).await?;
    let mut buf = vec![0u8; limit];
    let n = pipe.read(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}

pub async fn read_to_end(path: &Path) -> io::Result<String> {
    let mut pipe = File::open(path).await?;
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
