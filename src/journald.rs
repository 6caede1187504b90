use crate::error::JournalError;
use crate::fields::{MESSAGE, PRIORITY};
use crate::level::Priority;
use crate::sink::JournalSink;
use std::collections::HashMap;
use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

/// Socket journald listens on for native protocol datagrams.
pub const DEFAULT_SOCKET_PATH: &str = "/run/systemd/journal/socket";

/// Configuration for [`JournaldSink`].
#[derive(Clone, Debug)]
pub struct JournaldConfig {
    /// Path of the journald native socket.
    pub socket_path: PathBuf,
}

impl Default for JournaldConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
        }
    }
}

/// journald implementation of [`JournalSink`] using the native datagram
/// protocol.
///
/// Each entry is encoded into a single datagram. When the kernel refuses
/// it as too large, the payload is written to a sealed memfd and the
/// descriptor is passed to journald instead (Linux only).
#[derive(Debug)]
pub struct JournaldSink {
    socket: UnixDatagram,
    config: JournaldConfig,
}

impl JournaldSink {
    /// Sink for the system journal at [`DEFAULT_SOCKET_PATH`].
    pub fn new() -> Result<Self, JournalError> {
        Self::with_config(JournaldConfig::default())
    }

    /// Construct a sink for the socket named in `config`.
    ///
    /// Only a local unbound socket is created here; whether the journal
    /// is actually listening shows up on the first send, or ahead of
    /// time through [`enabled`](Self::enabled).
    pub fn with_config(config: JournaldConfig) -> Result<Self, JournalError> {
        let socket = UnixDatagram::unbound().map_err(JournalError::Socket)?;
        Ok(Self { socket, config })
    }

    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Whether a journal is listening on the configured socket.
    pub fn enabled(&self) -> bool {
        UnixDatagram::unbound()
            .and_then(|probe| probe.connect(&self.config.socket_path))
            .is_ok()
    }

    fn send_payload(&self, payload: &[u8]) -> io::Result<()> {
        match self.socket.send_to(payload, &self.config.socket_path) {
            Ok(_) => Ok(()),
            #[cfg(target_os = "linux")]
            Err(e) if matches!(e.raw_os_error(), Some(libc::EMSGSIZE) | Some(libc::ENOBUFS)) => {
                memfd::send(&self.socket, &self.config.socket_path, payload)
            }
            Err(e) => Err(e),
        }
    }
}

impl JournalSink for JournaldSink {
    fn send(
        &self,
        message: &str,
        priority: Priority,
        fields: &HashMap<String, String>,
    ) -> Result<(), JournalError> {
        let payload = encode_entry(message, priority, fields);
        self.send_payload(&payload)
            .map_err(|source| JournalError::Send {
                path: self.config.socket_path.clone(),
                source,
            })
    }
}

/// Encode one entry in the journald native format.
///
/// Fields whose name the journal would not accept are left out with a
/// warning on stderr; the rest of the entry is still encoded.
pub fn encode_entry(message: &str, priority: Priority, fields: &HashMap<String, String>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64 + message.len());
    append_field(&mut buf, PRIORITY, priority.to_string().as_bytes());
    append_field(&mut buf, MESSAGE, message.as_bytes());
    for (name, value) in fields {
        if let Some(problem) = field_name_problem(name) {
            eprintln!("journal: field {:?} {}, ignoring", name, problem);
            continue;
        }
        append_field(&mut buf, name, value.as_bytes());
    }
    buf
}

/// Whether `name` follows the journal's naming rules: non-empty, only
/// `A-Z`, `0-9` and `_`, and no leading underscore (reserved for trusted
/// fields).
pub fn is_valid_field_name(name: &str) -> bool {
    field_name_problem(name).is_none()
}

fn field_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("is empty");
    }
    if name.starts_with('_') {
        return Some("begins with an underscore");
    }
    let legal = name
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
    if !legal {
        return Some("contains invalid characters");
    }
    None
}

fn append_field(buf: &mut Vec<u8>, name: &str, value: &[u8]) {
    buf.extend_from_slice(name.as_bytes());
    if value.contains(&b'\n') {
        // Binary-safe form: NAME\n<u64 le length><bytes>\n
        buf.push(b'\n');
        buf.extend_from_slice(&(value.len() as u64).to_le_bytes());
    } else {
        buf.push(b'=');
    }
    buf.extend_from_slice(value);
    buf.push(b'\n');
}

#[cfg(target_os = "linux")]
mod memfd {
    use std::fs::File;
    use std::io::{self, Write};
    use std::mem;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
    use std::os::unix::net::UnixDatagram;
    use std::path::Path;
    use std::ptr;

    /// Write `payload` to a sealed memfd and hand the descriptor to the
    /// journal socket at `path` with `SCM_RIGHTS`.
    pub(super) fn send(socket: &UnixDatagram, path: &Path, payload: &[u8]) -> io::Result<()> {
        let name = b"tracing-journal-hook\0";
        let fd = unsafe {
            libc::memfd_create(name.as_ptr().cast(), libc::MFD_ALLOW_SEALING | libc::MFD_CLOEXEC)
        };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        let mut file = unsafe { File::from_raw_fd(fd) };
        file.write_all(payload)?;

        // journald only accepts memfds that can no longer change.
        let seals = libc::F_SEAL_SHRINK | libc::F_SEAL_GROW | libc::F_SEAL_WRITE | libc::F_SEAL_SEAL;
        if unsafe { libc::fcntl(file.as_raw_fd(), libc::F_ADD_SEALS, seals) } < 0 {
            return Err(io::Error::last_os_error());
        }

        send_fd(socket, path, file.as_raw_fd())
    }

    fn send_fd(socket: &UnixDatagram, path: &Path, fd: RawFd) -> io::Result<()> {
        let mut addr: libc::sockaddr_un = unsafe { mem::zeroed() };
        addr.sun_family = libc::AF_UNIX as libc::sa_family_t;
        let bytes = path.as_os_str().as_bytes();
        if bytes.len() >= addr.sun_path.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "journal socket path too long"));
        }
        for (dst, src) in addr.sun_path.iter_mut().zip(bytes) {
            *dst = *src as libc::c_char;
        }

        let space = unsafe { libc::CMSG_SPACE(mem::size_of::<RawFd>() as u32) } as usize;
        // u64 storage keeps the control buffer aligned for cmsghdr.
        let mut control = vec![0u64; (space + 7) / 8];

        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        msg.msg_name = (&mut addr as *mut libc::sockaddr_un).cast();
        msg.msg_namelen = mem::size_of::<libc::sockaddr_un>() as libc::socklen_t;
        msg.msg_control = control.as_mut_ptr().cast();
        msg.msg_controllen = space as _;

        unsafe {
            let cmsg = libc::CMSG_FIRSTHDR(&msg);
            (*cmsg).cmsg_level = libc::SOL_SOCKET;
            (*cmsg).cmsg_type = libc::SCM_RIGHTS;
            (*cmsg).cmsg_len = libc::CMSG_LEN(mem::size_of::<RawFd>() as u32) as _;
            ptr::write_unaligned(libc::CMSG_DATA(cmsg) as *mut RawFd, fd);
        }

        if unsafe { libc::sendmsg(socket.as_raw_fd(), &msg, 0) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_values_use_equals_form() {
        let payload = encode_entry("hello", Priority::Info, &HashMap::new());
        assert_eq!(payload, b"PRIORITY=6\nMESSAGE=hello\n");
    }

    #[test]
    fn multiline_values_are_length_prefixed() {
        let mut fields = HashMap::new();
        fields.insert("STACK".to_string(), "a\nb".to_string());

        let payload = encode_entry("boom", Priority::Err, &fields);

        let mut expected = b"PRIORITY=3\nMESSAGE=boom\nSTACK\n".to_vec();
        expected.extend_from_slice(&3u64.to_le_bytes());
        expected.extend_from_slice(b"a\nb\n");
        assert_eq!(payload, expected);
    }

    #[test]
    fn field_names_are_checked() {
        assert!(!is_valid_field_name(""));
        assert!(!is_valid_field_name("_PID"));
        assert!(!is_valid_field_name("lower"));
        assert!(is_valid_field_name("CODE_LINE"));
    }

    #[test]
    fn invalid_names_are_left_out() {
        let mut fields = HashMap::new();
        fields.insert("OK".to_string(), "1".to_string());
        fields.insert(String::new(), "2".to_string());

        let payload = encode_entry("msg", Priority::Info, &fields);
        assert_eq!(payload, b"PRIORITY=6\nMESSAGE=msg\nOK=1\n");
    }

    #[test]
    fn missing_socket_is_reported() {
        let sink = JournaldSink::with_config(JournaldConfig {
            socket_path: PathBuf::from("/nonexistent/journal/socket"),
        })
        .unwrap();

        assert!(!sink.enabled());
        let err = sink
            .send("msg", Priority::Info, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, JournalError::Send { .. }));
    }
}
