//! Ctrl+C against the real binary while it is stuck dialling.
//!
//! A loopback listener with a zero backlog and one queued connection drops
//! further SYNs, so the client's blocking connect hangs until interrupted.

use std::io::Read;
use std::net::{Ipv4Addr, SocketAddrV4, TcpStream};
use std::os::fd::OwnedFd;
use std::os::unix::io::AsRawFd;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::sys::socket::{
    bind, getsockname, listen, socket, AddressFamily, Backlog, SockFlag, SockType, SockaddrIn,
};
use nix::unistd::Pid;

/// A listening socket whose accept queue is already full.
fn saturated_listener() -> (OwnedFd, TcpStream, u16) {
    let fd = socket(
        AddressFamily::Inet,
        SockType::Stream,
        SockFlag::SOCK_CLOEXEC,
        None,
    )
    .unwrap();
    bind(
        fd.as_raw_fd(),
        &SockaddrIn::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)),
    )
    .unwrap();
    listen(&fd, Backlog::new(0).unwrap()).unwrap();
    let port = getsockname::<SockaddrIn>(fd.as_raw_fd()).unwrap().port();

    let queued = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap();
    (fd, queued, port)
}

#[test]
fn interrupt_during_connect_exits() {
    let (_listener, _queued, port) = saturated_listener();

    let mut child = Command::new(env!("CARGO_BIN_EXE_p2p-chat"))
        .args(["-p", &port.to_string(), "connect", "127.0.0.1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(1500));
    assert!(child.try_wait().unwrap().is_none(), "connect should still be pending");

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("client ignored the interrupt while connecting");
        }
        thread::sleep(Duration::from_millis(50));
    };

    let mut out = String::new();
    child.stdout.take().unwrap().read_to_string(&mut out).unwrap();
    assert!(status.success(), "exit status {:?}", status);
    assert!(out.contains("Connecting to 127.0.0.1:"), "{}", out);
    assert!(out.contains("Connection attempt cancelled"), "{}", out);
}
