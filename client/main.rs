// p2p-chat: two-party terminal chat over a direct TCP connection
use clap::{Parser, Subcommand};
use crossbeam::channel::{unbounded, Receiver, Sender};
use p2pchat::{
    outbound_ipv4, signal, spawn_stdin_reader, ChatConfig, EstablishError, HostListener,
    InboundEnd, Input, LineSource, Notice, Role, Session, TcpTransport, TerminalTranscript,
    Transcript, Transport, TransportListener,
};
use std::io::{self, Write};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "p2p-chat")]
#[command(about = "Two-party text chat over a direct TCP connection", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Port both peers use (overrides P2P_CHAT_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for the peer to connect
    Host {
        /// Address to bind on instead of the discovered one
        #[arg(long, value_name = "IP")]
        bind: Option<Ipv4Addr>,
    },

    /// Connect to a waiting host
    Connect {
        /// Host address; asked for interactively when missing
        #[arg(value_name = "ADDRESS")]
        address: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ChatConfig::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }

    // Must run before any other thread exists
    signal::install()?;

    let (input_tx, mut input) = unbounded();
    spawn_stdin_reader(input_tx.clone())?;
    signal::on_interrupt(signal::cancel_input(input_tx.clone()));

    let mut transcript = TerminalTranscript;

    let (role, address) = match cli.command {
        Some(Commands::Host { bind }) => {
            if bind.is_some() {
                config.bind_ip = bind;
            }
            (Role::Host, None)
        }
        Some(Commands::Connect { address }) => (Role::Client, address),
        None => match ask_role(&mut input) {
            Some(role) => (role, None),
            None => return Ok(()),
        },
    };

    let transport = match role {
        Role::Host => host(&config, &input_tx, &mut transcript),
        Role::Client => {
            let address = match address {
                Some(address) => address,
                None => match ask(&mut input, "Enter the host's IP address: ") {
                    Some(address) => address.trim().to_string(),
                    None => return Ok(()),
                },
            };
            connect(&address, config.port, &input_tx, &mut transcript)
        }
    };

    transcript.notice(&Notice::ChatStarted);

    let session = Session::new(transport, role).with_recv_buffer(config.recv_buffer);
    let end = session.run(&mut input, transcript, |end| match end {
        // Our own writer closed the stream; main is already on its way out
        InboundEnd::LocallyClosed => {}
        end => {
            tracing::debug!(?end, "read side gone, exiting");
            process::exit(0);
        }
    })?;
    tracing::debug!(?end, "session finished");

    transcript.notice(&Notice::SessionEnded);
    Ok(())
}

fn ask(input: &mut Receiver<Input>, question: &str) -> Option<String> {
    print!("{}", question);
    let _ = io::stdout().flush();
    match input.next_line() {
        Input::Line(line) => Some(line),
        Input::End | Input::Cancelled => {
            println!();
            None
        }
    }
}

fn ask_role(input: &mut Receiver<Input>) -> Option<Role> {
    loop {
        let answer = ask(
            input,
            "Do you want to (1) Host a chat or (2) Connect to a chat? [1/2]: ",
        )?;
        match Role::from_choice(&answer) {
            Some(role) => return Some(role),
            None => println!("Invalid choice. Please enter 1 or 2."),
        }
    }
}

fn host(
    config: &ChatConfig,
    input_tx: &Sender<Input>,
    transcript: &mut TerminalTranscript,
) -> TcpTransport {
    let ip = config.bind_ip.unwrap_or_else(outbound_ipv4);
    let listener = match HostListener::bind(SocketAddrV4::new(ip, config.port)) {
        Ok(listener) => listener,
        Err(e) => setup_failed(e),
    };

    transcript.notice(&Notice::HostingOn(ip.to_string()));
    transcript.notice(&Notice::ListeningOn(config.port));
    transcript.notice(&Notice::WaitingForPeer);

    signal::on_interrupt(signal::cancel_accept(listener.canceller(), input_tx.clone()));
    let accepted = listener.accept();
    signal::on_interrupt(signal::cancel_input(input_tx.clone()));

    match accepted {
        Ok(transport) => {
            match transport.peer_addr() {
                Ok(peer) => transcript.notice(&Notice::ConnectedBy(peer)),
                Err(e) => tracing::debug!(error = %e, "accepted peer has no address"),
            }
            transport
        }
        Err(EstablishError::AcceptInterrupted) => {
            transcript.notice(&Notice::HostCancelled);
            process::exit(0);
        }
        Err(e) => setup_failed(e),
    }
}

fn connect(
    address: &str,
    port: u16,
    input_tx: &Sender<Input>,
    transcript: &mut TerminalTranscript,
) -> TcpTransport {
    transcript.notice(&Notice::ConnectingTo(format!("{}:{}", address, port)));

    // A blocking connect cannot be woken, so an interrupt here ends the process
    signal::on_interrupt(|| {
        TerminalTranscript.notice(&Notice::ConnectCancelled);
        process::exit(0);
    });
    let connected = TcpTransport::connect(address, port);
    signal::on_interrupt(signal::cancel_input(input_tx.clone()));

    match connected {
        Ok(transport) => {
            transcript.notice(&Notice::ConnectionSuccessful);
            transport
        }
        Err(e) => setup_failed(e),
    }
}

fn setup_failed(e: EstablishError) -> ! {
    tracing::debug!(error = ?e, "setup failed");
    println!("[!] {}", e);
    process::exit(1);
}
