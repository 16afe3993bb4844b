//! Detaching the process from its standard streams.
//!
//! Streams are pointed at `/dev/null` rather than closed, so later opens can
//! never be handed descriptors 0-2 by accident.

use std::io;

/// Redirects stdin to `/dev/null`, and stdout/stderr too unless
/// `keep_output` is set (the log sink writes to them).
#[cfg(unix)]
pub(crate) fn detach(keep_output: bool) -> io::Result<()> {
    use std::fs::OpenOptions;
    use std::os::fd::AsRawFd;

    let devnull = OpenOptions::new().read(true).write(true).open("/dev/null")?;
    let fd = devnull.as_raw_fd();

    redirect(fd, libc::STDIN_FILENO)?;
    if !keep_output {
        redirect(fd, libc::STDOUT_FILENO)?;
        redirect(fd, libc::STDERR_FILENO)?;
    }
    tracing::debug!(keep_output, "standard streams detached");
    Ok(())
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn redirect(src: libc::c_int, dst: libc::c_int) -> io::Result<()> {
    // SAFETY: both descriptors are valid for the duration of the call;
    // dup2 atomically replaces `dst` and leaves `src` untouched.
    if unsafe { libc::dup2(src, dst) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn detach(keep_output: bool) -> io::Result<()> {
    tracing::debug!(keep_output, "stream detaching is not supported on this platform");
    Ok(())
}
