use crate::{CallbackId, CallbackRegistry, Controller, LinkError, MessageCallback};
use hwscan_core::protocol::{
    is_login_prompt, LineFramer, Message, Request, SessionCommand, DEFAULT_PORT, LINE_TERMINATOR,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const CHANNEL_DEPTH: usize = 128;
const READ_CHUNK: usize = 512;

/// Connection settings for [`HomeworksTcpLink`].
#[derive(Debug, Clone)]
pub struct TcpLinkConfig {
    pub host: String,
    pub port: u16,
    /// Sent verbatim when the controller prints its login prompt,
    /// e.g. `"lutron, integration"`.
    pub login: Option<String>,
    /// Sent once the session is ready.
    pub session_commands: Vec<SessionCommand>,
    pub connect_timeout: Duration,
}

impl TcpLinkConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            login: None,
            session_commands: SessionCommand::MONITORING.to_vec(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

/// Controller connection over the TCP terminal interface.
///
/// Outbound lines are queued to a writer task; a reader task frames inbound
/// bytes, answers the login prompt, decodes each line, and dispatches it to
/// registered callbacks. Either task failing marks the link closed.
#[derive(Debug)]
pub struct HomeworksTcpLink {
    peer: SocketAddr,
    outbound: mpsc::Sender<String>,
    callbacks: Arc<CallbackRegistry>,
    closed: Arc<AtomicBool>,
    login_rejected: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl HomeworksTcpLink {
    pub async fn connect(config: TcpLinkConfig) -> Result<Self, LinkError> {
        let stream = timeout(
            config.connect_timeout,
            TcpStream::connect((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| LinkError::Timeout)??;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        log::info!("connected to controller at {peer}");

        let (reader, writer) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::channel::<String>(CHANNEL_DEPTH);
        let callbacks = Arc::new(CallbackRegistry::new());
        let closed = Arc::new(AtomicBool::new(false));
        let login_rejected = Arc::new(AtomicBool::new(false));

        tokio::spawn(write_loop(writer, outbound_rx, closed.clone()));

        let session = SessionSetup {
            login: config.login,
            commands: config.session_commands,
            answered: false,
        };
        if session.login.is_none() {
            session.start(&outbound_tx).await;
        }
        let reader = tokio::spawn(read_loop(
            reader,
            session,
            outbound_tx.clone(),
            callbacks.clone(),
            LinkState {
                closed: closed.clone(),
                login_rejected: login_rejected.clone(),
            },
        ));

        Ok(Self {
            peer,
            outbound: outbound_tx,
            callbacks,
            closed,
            login_rejected,
            reader,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Queues a raw line, without terminator.
    pub async fn send_line(&self, line: impl Into<String>) -> Result<(), LinkError> {
        if self.is_closed() {
            return Err(self.closed_error());
        }
        self.outbound
            .send(line.into())
            .await
            .map_err(|_| self.closed_error())
    }

    pub async fn send_session_command(&self, command: SessionCommand) -> Result<(), LinkError> {
        self.send_line(command.as_str()).await
    }
}

impl Controller for HomeworksTcpLink {
    async fn send(&self, request: Request) -> Result<(), LinkError> {
        self.send_line(request.to_string()).await
    }

    fn register_message_callback(
        &self,
        callback: MessageCallback,
    ) -> Result<CallbackId, LinkError> {
        if self.is_closed() {
            return Err(self.closed_error());
        }
        self.callbacks.register(callback)
    }

    fn unregister_message_callback(&self, id: CallbackId) -> bool {
        self.callbacks.unregister(id)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn closed_error(&self) -> LinkError {
        if self.login_rejected.load(Ordering::Acquire) {
            LinkError::LoginRejected
        } else {
            LinkError::Closed
        }
    }
}

impl Drop for HomeworksTcpLink {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

struct SessionSetup {
    login: Option<String>,
    commands: Vec<SessionCommand>,
    answered: bool,
}

struct LinkState {
    closed: Arc<AtomicBool>,
    login_rejected: Arc<AtomicBool>,
}

impl SessionSetup {
    async fn start(&self, outbound: &mpsc::Sender<String>) {
        for command in &self.commands {
            if outbound.send(command.as_str().to_string()).await.is_err() {
                return;
            }
        }
    }

    /// Answers the first prompt. Returns `false` when the login failed: no
    /// login is configured, or the controller prompts again after our answer.
    async fn on_login_prompt(&mut self, outbound: &mpsc::Sender<String>) -> bool {
        let Some(login) = &self.login else {
            log::warn!("controller requested a login but none is configured");
            return false;
        };
        if self.answered {
            log::warn!("controller rejected the login");
            return false;
        }
        self.answered = true;
        log::debug!("answering controller login prompt");
        if outbound.send(login.clone()).await.is_ok() {
            self.start(outbound).await;
        }
        true
    }
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::Receiver<String>,
    closed: Arc<AtomicBool>,
) {
    while let Some(mut line) = outbound.recv().await {
        line.push_str(LINE_TERMINATOR);
        if let Err(err) = writer.write_all(line.as_bytes()).await {
            log::warn!("controller write failed: {err}");
            break;
        }
    }
    closed.store(true, Ordering::Release);
    let _ = writer.shutdown().await;
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    mut session: SessionSetup,
    outbound: mpsc::Sender<String>,
    callbacks: Arc<CallbackRegistry>,
    state: LinkState,
) {
    let mut framer = LineFramer::new();
    let mut buf = [0u8; READ_CHUNK];
    'read: loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                log::info!("controller closed the connection");
                break;
            }
            Ok(n) => n,
            Err(err) => {
                log::warn!("controller read failed: {err}");
                break;
            }
        };
        framer.push(&buf[..n]);

        while let Some(line) = framer.next_line() {
            if !is_login_prompt(&line) {
                match Message::decode(&line) {
                    Ok(message) => callbacks.dispatch(&message),
                    Err(err) => log::debug!("ignoring undecodable line {line:?}: {err}"),
                }
                continue;
            }
            if !session.on_login_prompt(&outbound).await {
                state.login_rejected.store(true, Ordering::Release);
                break 'read;
            }
        }
        if framer.take_login_prompt() && !session.on_login_prompt(&outbound).await {
            state.login_rejected.store(true, Ordering::Release);
            break;
        }
    }
    state.closed.store(true, Ordering::Release);
}
