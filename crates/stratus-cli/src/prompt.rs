use std::io::{self, BufRead, IsTerminal, Write};

use zeroize::Zeroizing;

/// Read a secret from stdin after printing `label` on stderr. Echo is
/// turned off while a terminal is attached; piped input is read as-is.
pub(crate) fn read_secret(label: &str) -> io::Result<Zeroizing<String>> {
    eprint!("{label}");
    io::stderr().flush()?;

    let stdin = io::stdin();
    let mut line = Zeroizing::new(String::new());
    let _echo = if stdin.is_terminal() {
        EchoOff::engage(&stdin)?
    } else {
        None
    };
    stdin.lock().read_line(&mut line)?;

    strip_line_ending(&mut line);
    Ok(line)
}

/// Read a password for a new archive. A blank first answer is returned
/// as-is (no encryption); anything else must be typed twice.
pub(crate) fn read_new_secret(label: &str) -> io::Result<Zeroizing<String>> {
    let first = read_secret(label)?;
    if first.is_empty() {
        return Ok(first);
    }
    let second = read_secret("Repeat password: ")?;
    confirm(first, &second)
}

fn confirm(first: Zeroizing<String>, second: &str) -> io::Result<Zeroizing<String>> {
    if first.as_str() == second {
        Ok(first)
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "passwords do not match",
        ))
    }
}

fn strip_line_ending(line: &mut String) {
    let keep = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(keep);
}

/// Terminal echo switched off for as long as the value lives.
#[cfg(unix)]
struct EchoOff {
    fd: i32,
    saved: libc::termios,
}

#[cfg(unix)]
impl EchoOff {
    fn engage(stdin: &io::Stdin) -> io::Result<Option<Self>> {
        use std::os::fd::AsRawFd;

        let fd = stdin.as_raw_fd();
        // SAFETY: termios is plain data; tcgetattr fills it before use.
        let mut saved = unsafe { std::mem::zeroed::<libc::termios>() };
        // SAFETY: fd is the open stdin descriptor and `saved` is writable.
        if unsafe { libc::tcgetattr(fd, &mut saved) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut quiet = saved;
        quiet.c_lflag &= !libc::ECHO;
        quiet.c_lflag |= libc::ECHONL;
        // SAFETY: `quiet` is a modified copy of a valid termios.
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &quiet) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Some(Self { fd, saved }))
    }
}

#[cfg(unix)]
impl Drop for EchoOff {
    fn drop(&mut self) {
        // SAFETY: `saved` came from a successful tcgetattr on the same fd.
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSANOW, &self.saved);
        }
    }
}

#[cfg(not(unix))]
struct EchoOff;

#[cfg(not(unix))]
impl EchoOff {
    fn engage(_stdin: &io::Stdin) -> io::Result<Option<Self>> {
        Ok(None)
    }
}
