//! Process lifecycle: daemon mode, PID file lock, termination signals

#![allow(unsafe_code)] // daemon(3), umask(2), flock(2) and sigprocmask require unsafe

use log::info;
use std::fs::{self, File, OpenOptions};
use std::future::Future;
use std::io::{self, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use tokio::signal::unix::{signal, SignalKind};

use crate::domain::{DaemonError, ExecutionMode};

pub const DEFAULT_PID_FILE: &str = "/var/run/cachestat.pid";

/// Exclusive lock on a PID file, removed on drop
///
/// The lock is an `flock(2)` on the open file, so it is inherited across
/// `fork` and released by the kernel if the process dies without cleanup.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    file: File,
}

impl PidFile {
    /// Lock `path` and write the current PID into it
    ///
    /// # Errors
    /// - [`DaemonError::AlreadyRunning`] if another process holds the lock
    /// - [`DaemonError::PidFile`] if the file cannot be opened or written
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, DaemonError> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| DaemonError::PidFile { path: path.clone(), source })?;

        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
                return Err(DaemonError::AlreadyRunning { path });
            }
            return Err(DaemonError::PidFile { path, source: err });
        }

        let mut pid_file = Self { path, file };
        pid_file.write_pid()?;
        Ok(pid_file)
    }

    /// Rewrite the file with the current PID (needed after forking)
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn write_pid(&mut self) -> Result<(), DaemonError> {
        let pid = std::process::id();
        let result = (|| {
            self.file.set_len(0)?;
            self.file.seek(SeekFrom::Start(0))?;
            writeln!(self.file, "{pid}")?;
            self.file.sync_all()
        })();
        result.map_err(|source| DaemonError::PidFile { path: self.path.clone(), source })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Detach from the controlling terminal
///
/// Forks, chdirs to `/` and points stdio at `/dev/null`. Other open file
/// descriptors (log file, PID file, eBPF objects) survive. Must run before
/// any async runtime or extra thread exists.
///
/// # Errors
/// Returns an error if `daemon(3)` fails
pub fn detach() -> Result<(), DaemonError> {
    if unsafe { libc::daemon(0, 0) } != 0 {
        return Err(DaemonError::Detach(io::Error::last_os_error()));
    }
    unsafe {
        libc::umask(0o002);
    }
    Ok(())
}

/// Holds SIGTERM and SIGINT pending until dropped
///
/// Covers startup, before [`termination`] can install handlers: without it
/// the default action kills the process and the PID file is left behind.
/// Pending signals are delivered on drop. The mask survives `daemon(3)`.
pub struct DeferredSignals {
    previous: libc::sigset_t,
}

impl DeferredSignals {
    /// Block SIGTERM and SIGINT on the calling thread
    ///
    /// # Errors
    /// Returns an error if the signal mask cannot be changed
    pub fn block() -> io::Result<Self> {
        let mut set = unsafe { std::mem::zeroed::<libc::sigset_t>() };
        let mut previous = unsafe { std::mem::zeroed::<libc::sigset_t>() };
        unsafe {
            libc::sigemptyset(&mut set);
            libc::sigaddset(&mut set, libc::SIGTERM);
            libc::sigaddset(&mut set, libc::SIGINT);
        }

        let rc = unsafe { libc::pthread_sigmask(libc::SIG_BLOCK, &set, &mut previous) };
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        Ok(Self { previous })
    }
}

impl Drop for DeferredSignals {
    fn drop(&mut self) {
        unsafe {
            libc::pthread_sigmask(libc::SIG_SETMASK, &self.previous, std::ptr::null_mut());
        }
    }
}

/// Resolves on the first SIGTERM or SIGINT
///
/// Handlers are installed immediately so a signal arriving before the
/// returned future is first polled is not missed. Must be called inside a
/// tokio runtime.
///
/// # Errors
/// Returns an error if a signal handler cannot be installed
pub fn termination(mode: ExecutionMode) -> io::Result<impl Future<Output = ()>> {
    let mut term = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = term.recv() => {}
            _ = interrupt.recv() => {}
        }
        info!("Terminating cachestat ({mode} mode)...");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_file_written_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cachestat.pid");

        let pid_file = PidFile::acquire(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
        assert_eq!(pid_file.path(), path);

        drop(pid_file);
        assert!(!path.exists());
    }

    #[test]
    fn test_second_instance_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cachestat.pid");

        let _held = PidFile::acquire(&path).unwrap();
        let err = PidFile::acquire(&path).unwrap_err();
        assert!(matches!(err, DaemonError::AlreadyRunning { .. }));
    }

    #[test]
    fn test_stale_pid_file_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cachestat.pid");
        fs::write(&path, "999999999\nleftover\n").unwrap();

        let _pid_file = PidFile::acquire(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}\n", std::process::id()));
    }

    #[test]
    fn test_unwritable_location() {
        let err = PidFile::acquire("/nonexistent/dir/cachestat.pid").unwrap_err();
        assert!(matches!(err, DaemonError::PidFile { .. }));
    }

    #[tokio::test]
    async fn test_termination_resolves_on_sigterm() {
        let shutdown = termination(ExecutionMode::Foreground).unwrap();
        unsafe {
            libc::raise(libc::SIGTERM);
        }
        tokio::time::timeout(std::time::Duration::from_secs(5), shutdown).await.unwrap();
    }

    #[tokio::test]
    async fn test_signal_during_startup_is_held_until_handlers_exist() {
        let deferred = DeferredSignals::block().unwrap();
        unsafe {
            libc::raise(libc::SIGINT);
        }

        // Still alive, signal pending
        let mut pending = unsafe { std::mem::zeroed::<libc::sigset_t>() };
        unsafe {
            libc::sigpending(&mut pending);
        }
        assert_eq!(unsafe { libc::sigismember(&pending, libc::SIGINT) }, 1);

        let shutdown = termination(ExecutionMode::Foreground).unwrap();
        drop(deferred);
        tokio::time::timeout(std::time::Duration::from_secs(5), shutdown).await.unwrap();
    }
}
