#![cfg(unix)]

use std::collections::HashMap;
use std::os::unix::net::UnixDatagram;

use tracing_journal_hook::journald::{JournaldConfig, JournaldSink};
use tracing_journal_hook::{CallSite, JournalHook, LogEvent, Severity};

fn parse_simple_fields(payload: &[u8]) -> HashMap<String, String> {
    String::from_utf8(payload.to_vec())
        .unwrap()
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn entry_arrives_on_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.socket");
    let server = UnixDatagram::bind(&path).unwrap();

    let sink = JournaldSink::with_config(JournaldConfig { socket_path: path.clone() }).unwrap();
    assert!(sink.enabled());
    let hook = JournalHook::new(sink);

    let event = LogEvent::new(Severity::Panic, "unrecoverable state")
        .with_field("request-id", "r-17")
        .with_caller(CallSite {
            file: "/a/b.go".to_string(),
            line: 42,
            function: "main.Run".to_string(),
        });
    hook.fire(&event).unwrap();

    let mut buf = vec![0u8; 4096];
    let n = server.recv(&mut buf).unwrap();
    let fields = parse_simple_fields(&buf[..n]);

    assert_eq!(fields["PRIORITY"], "1");
    assert_eq!(fields["MESSAGE"], "unrecoverable state");
    assert_eq!(fields["REQUEST_ID"], "r-17");
    assert_eq!(fields["CODE_FILE"], "/a/b.go");
    assert_eq!(fields["CODE_LINE"], "42");
    assert_eq!(fields["CODE_FUNC"], "main.Run");
}

#[test]
fn unusable_field_names_are_dropped_but_entry_arrives() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.socket");
    let server = UnixDatagram::bind(&path).unwrap();

    let hook = JournalHook::new(
        JournaldSink::with_config(JournaldConfig { socket_path: path }).unwrap(),
    );
    let event = LogEvent::new(Severity::Info, "hello")
        .with_field("ключ", 1)
        .with_field("__", 2)
        .with_field("kept", 3);
    hook.fire(&event).unwrap();

    let mut buf = vec![0u8; 4096];
    let n = server.recv(&mut buf).unwrap();
    let fields = parse_simple_fields(&buf[..n]);

    assert_eq!(fields["PRIORITY"], "6");
    assert_eq!(fields["MESSAGE"], "hello");
    assert_eq!(fields["KEPT"], "3");
    assert_eq!(fields.len(), 3);
    assert!(!fields.contains_key(""));
}

#[cfg(target_os = "linux")]
fn recv_passed_fd(socket: &UnixDatagram) -> std::os::unix::io::RawFd {
    use std::os::unix::io::{AsRawFd, RawFd};

    let space = unsafe { libc::CMSG_SPACE(std::mem::size_of::<RawFd>() as u32) } as usize;
    let mut control = vec![0u64; (space + 7) / 8];
    let mut data = [0u8; 16];
    let mut iov = libc::iovec {
        iov_base: data.as_mut_ptr().cast(),
        iov_len: data.len(),
    };

    let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;
    msg.msg_control = control.as_mut_ptr().cast();
    msg.msg_controllen = space as _;

    let n = unsafe { libc::recvmsg(socket.as_raw_fd(), &mut msg, 0) };
    assert_eq!(n, 0, "payload must travel in the descriptor");

    unsafe {
        let cmsg = libc::CMSG_FIRSTHDR(&msg);
        assert!(!cmsg.is_null());
        assert_eq!((*cmsg).cmsg_level, libc::SOL_SOCKET);
        assert_eq!((*cmsg).cmsg_type, libc::SCM_RIGHTS);
        std::ptr::read_unaligned(libc::CMSG_DATA(cmsg) as *const RawFd)
    }
}

#[cfg(target_os = "linux")]
#[test]
fn oversized_entry_is_passed_as_memfd() {
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom};
    use std::os::unix::io::FromRawFd;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.socket");
    let server = UnixDatagram::bind(&path).unwrap();

    let hook = JournalHook::new(
        JournaldSink::with_config(JournaldConfig { socket_path: path }).unwrap(),
    );
    let message = "x".repeat(300_000);
    hook.fire(&LogEvent::new(Severity::Error, message.clone()).with_field("trace", "a\nb"))
        .unwrap();

    let fd = recv_passed_fd(&server);
    let mut file = unsafe { File::from_raw_fd(fd) };
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut payload = Vec::new();
    file.read_to_end(&mut payload).unwrap();

    let mut expected = format!("PRIORITY=3\nMESSAGE={}\nTRACE\n", message).into_bytes();
    expected.extend_from_slice(&3u64.to_le_bytes());
    expected.extend_from_slice(b"a\nb\n");
    assert_eq!(payload.len(), expected.len());
    assert!(payload == expected);
}
