//! Chat socket driver.
//!
//! [`ChatClient::open`] spawns one driver task per chat surface. The task owns
//! the socket and runs a `select!` loop over inbound frames, send commands,
//! reconnect and logout timers, and a cancellation token. The UI talks to it
//! through the returned [`ChatHandle`] and observes it through [`ChatEvent`]s
//! and the shared [`ConversationStore`].
//!
//! Connection outcomes:
//! - a socket that closes before it ever opened is treated as rejected
//!   credentials: a warning is emitted and the user is logged out after
//!   `logout_delay`, unless the handle is shut down first;
//! - a socket that closes after having opened is reconnected per the
//!   [`ReconnectPolicy`], silently.

use std::sync::Arc;
use std::time::Duration;

use fusion_types::chat::{
    ChatMessage, ChatSurface, ConnectionState, Counterpart, MessageId, OutgoingChat,
};
use fusion_types::config::ClientConfig;
use fusion_types::error::ChatError;
use secrecy::ExposeSecret;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::conversation::ConversationStore;
use super::reconnect::ReconnectPolicy;
use super::socket::{ChatSocket, SocketConnector};
use crate::session::SessionStore;

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 256;

/// Invoked when the driver decides the session is no longer valid.
pub trait LogoutHook: Send + Sync + 'static {
    fn force_logout(&self);
}

/// Notifications emitted by a chat driver.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    State(ConnectionState),
    /// A message was appended to the conversation (live frame or local echo).
    Message(ChatMessage),
    /// A local echo was replaced by the server's copy.
    EchoConfirmed {
        local_id: MessageId,
        message: ChatMessage,
    },
    /// The socket closed before it ever opened; logout follows after `logout_in`.
    AuthFailure { logout_in: Duration },
    LoggedOut,
    Reconnecting { attempt: u32, delay: Duration },
    /// Reconnect attempts exhausted; the driver has stopped.
    GaveUp { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub ws_base_url: String,
    pub reconnect: ReconnectPolicy,
    pub logout_delay: Duration,
}

impl ChatOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            ws_base_url: config.ws_base_url.clone(),
            reconnect: ReconnectPolicy::from(&config.reconnect),
            logout_delay: Duration::from_secs(config.auth_failure_logout_delay_secs),
        }
    }
}

/// Opens chat surfaces against a [`SocketConnector`].
pub struct ChatClient<C: SocketConnector> {
    connector: Arc<C>,
    session: Arc<SessionStore>,
    conversations: Arc<ConversationStore>,
    logout: Arc<dyn LogoutHook>,
    options: ChatOptions,
}

impl<C: SocketConnector> ChatClient<C> {
    pub fn new(
        connector: Arc<C>,
        session: Arc<SessionStore>,
        conversations: Arc<ConversationStore>,
        logout: Arc<dyn LogoutHook>,
        options: ChatOptions,
    ) -> Self {
        Self {
            connector,
            session,
            conversations,
            logout,
            options,
        }
    }

    /// Start a driver for `surface`.
    ///
    /// The support surface starts from an empty conversation because the
    /// server replays history on connect. Admin surfaces keep whatever
    /// history the caller loaded beforehand.
    pub fn open(
        &self,
        surface: ChatSurface,
    ) -> Result<(ChatHandle, broadcast::Receiver<ChatEvent>), ChatError> {
        let identity = self.session.identity().ok_or(ChatError::NotLoggedIn)?;
        if !self.session.is_logged_in() {
            return Err(ChatError::NotLoggedIn);
        }

        if surface == ChatSurface::Support {
            self.conversations.clear(Counterpart::Support);
        }

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (event_tx, event_rx) = broadcast::channel(EVENT_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let cancel = CancellationToken::new();

        let driver = Driver {
            connector: Arc::clone(&self.connector),
            session: Arc::clone(&self.session),
            conversations: Arc::clone(&self.conversations),
            logout: Arc::clone(&self.logout),
            options: self.options.clone(),
            surface,
            author: identity.email,
            commands: command_rx,
            events: event_tx.clone(),
            state: state_tx,
            cancel: cancel.clone(),
        };

        tracing::info!(counterpart = %surface.counterpart(), "opening chat");
        let task = tokio::spawn(driver.run());

        let handle = ChatHandle {
            surface,
            commands: command_tx,
            state: state_rx,
            events: event_tx,
            conversations: Arc::clone(&self.conversations),
            cancel,
            task: Some(task),
        };
        Ok((handle, event_rx))
    }
}

enum Command {
    Send {
        text: String,
        reply: oneshot::Sender<Result<(), ChatError>>,
    },
}

/// Control side of a running chat driver.
///
/// Dropping the handle tears the driver down; [`ChatHandle::shutdown`] does
/// the same and waits for the task to finish.
pub struct ChatHandle {
    surface: ChatSurface,
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ConnectionState>,
    events: broadcast::Sender<ChatEvent>,
    conversations: Arc<ConversationStore>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ChatHandle {
    pub fn surface(&self) -> ChatSurface {
        self.surface
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Send `text`. Refused with [`ChatError::NotConnected`] unless the socket
    /// is open; nothing is transmitted in that case.
    pub async fn send(&self, text: impl Into<String>) -> Result<(), ChatError> {
        if self.state() != ConnectionState::Open {
            return Err(ChatError::NotConnected);
        }
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Send {
                text: text.into(),
                reply,
            })
            .await
            .map_err(|_| ChatError::NotConnected)?;
        response.await.map_err(|_| ChatError::NotConnected)?
    }

    /// Close the socket, cancel any pending logout and, for admin surfaces,
    /// drop the conversation.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "chat driver task failed");
            }
        }
        self.release_conversation();
    }

    fn release_conversation(&self) {
        if let ChatSurface::Admin { .. } = self.surface {
            self.conversations.clear(self.surface.counterpart());
        }
    }
}

impl Drop for ChatHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel.cancel();
            self.release_conversation();
        }
    }
}

enum ConnectionEnd {
    Shutdown,
    Dropped,
}

enum WaitOutcome {
    Elapsed,
    Cancelled,
}

struct Driver<C: SocketConnector> {
    connector: Arc<C>,
    session: Arc<SessionStore>,
    conversations: Arc<ConversationStore>,
    logout: Arc<dyn LogoutHook>,
    options: ChatOptions,
    surface: ChatSurface,
    author: String,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<ChatEvent>,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
}

impl<C: SocketConnector> Driver<C> {
    async fn run(mut self) {
        let counterpart = self.surface.counterpart();
        let mut has_opened = false;
        let mut failures: u32 = 0;

        loop {
            self.set_state(ConnectionState::Connecting);

            let Some(url) = self.socket_url() else {
                tracing::warn!(%counterpart, "no access token, chat stopped");
                break;
            };

            let connector = Arc::clone(&self.connector);
            let connect = connector.connect(&url);
            tokio::pin!(connect);
            let result = loop {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        self.set_state(ConnectionState::Closed);
                        return;
                    }
                    Some(command) = self.commands.recv() => refuse(command),
                    result = &mut connect => break result,
                }
            };

            match result {
                Ok(mut socket) => {
                    has_opened = true;
                    failures = 0;
                    self.set_state(ConnectionState::Open);
                    tracing::info!(%counterpart, "chat connected");

                    match self.run_connection(&mut socket).await {
                        ConnectionEnd::Shutdown => {
                            self.set_state(ConnectionState::Closing);
                            socket.close().await;
                            break;
                        }
                        ConnectionEnd::Dropped => {
                            tracing::info!(%counterpart, "chat socket closed by server");
                        }
                    }
                }
                Err(err) if !has_opened => {
                    self.auth_failure(err).await;
                    break;
                }
                Err(err) => {
                    tracing::debug!(%counterpart, error = %err, "chat reconnect attempt failed");
                }
            }

            self.set_state(ConnectionState::Closed);
            failures += 1;
            match self.options.reconnect.delay_for(failures) {
                Some(delay) => {
                    tracing::debug!(%counterpart, attempt = failures, ?delay, "scheduling chat reconnect");
                    self.emit(ChatEvent::Reconnecting {
                        attempt: failures,
                        delay,
                    });
                    if let WaitOutcome::Cancelled = self.wait(delay).await {
                        break;
                    }
                }
                None => {
                    let attempts = failures - 1;
                    tracing::warn!(%counterpart, attempts, "giving up on chat reconnect");
                    self.emit(ChatEvent::GaveUp { attempts });
                    break;
                }
            }
        }

        self.set_state(ConnectionState::Closed);
    }

    async fn run_connection(&mut self, socket: &mut C::Socket) -> ConnectionEnd {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return ConnectionEnd::Shutdown,
                command = self.commands.recv() => match command {
                    Some(Command::Send { text, reply }) => {
                        let result = transmit(socket, &text).await;
                        if result.is_ok() {
                            self.echo(text);
                        }
                        let _ = reply.send(result);
                    }
                    None => return ConnectionEnd::Shutdown,
                },
                frame = socket.next_frame() => match frame {
                    Some(Ok(text)) => self.handle_frame(&text),
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "chat socket error");
                        return ConnectionEnd::Dropped;
                    }
                    None => return ConnectionEnd::Dropped,
                },
            }
        }
    }

    /// Optimistic local copy of a sent message, on surfaces that show one.
    fn echo(&self, text: String) {
        if !self.surface.echoes_locally() {
            return;
        }
        let echo = ChatMessage::local(self.author.clone(), text);
        if self.conversations.append(self.surface.counterpart(), echo.clone()) {
            self.emit(ChatEvent::Message(echo));
        }
    }

    fn handle_frame(&self, text: &str) {
        let message: ChatMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed chat frame");
                return;
            }
        };
        let counterpart = self.surface.counterpart();

        if self.surface.echoes_locally() && message.user == self.author {
            if let Some(local_id) =
                self.conversations
                    .pending_echo(counterpart, &message.user, &message.message)
            {
                self.conversations
                    .reconcile(counterpart, &local_id, message.clone());
                self.emit(ChatEvent::EchoConfirmed { local_id, message });
                return;
            }
        }

        if self.conversations.append(counterpart, message.clone()) {
            self.emit(ChatEvent::Message(message));
        }
    }

    async fn auth_failure(&mut self, err: ChatError) {
        let delay = self.options.logout_delay;
        tracing::warn!(
            counterpart = %self.surface.counterpart(),
            error = %err,
            logout_in_secs = delay.as_secs(),
            "chat socket closed before opening, credentials were likely rejected"
        );
        self.set_state(ConnectionState::Closed);
        self.emit(ChatEvent::AuthFailure { logout_in: delay });

        match self.wait(delay).await {
            WaitOutcome::Elapsed => {
                tracing::info!("logging out after chat auth failure");
                self.logout.force_logout();
                self.emit(ChatEvent::LoggedOut);
            }
            WaitOutcome::Cancelled => {
                tracing::debug!("pending logout cancelled by teardown");
            }
        }
    }

    /// Sleep for `delay`, refusing sends meanwhile.
    async fn wait(&mut self, delay: Duration) -> WaitOutcome {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return WaitOutcome::Cancelled,
                _ = &mut sleep => return WaitOutcome::Elapsed,
                Some(command) = self.commands.recv() => refuse(command),
            }
        }
    }

    fn socket_url(&self) -> Option<String> {
        let token = self.session.access_token()?;
        Some(format!(
            "{}{}?token={}",
            self.options.ws_base_url.trim_end_matches('/'),
            self.surface.socket_path(),
            token.expose_secret()
        ))
    }

    fn set_state(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
        if changed {
            self.emit(ChatEvent::State(next));
        }
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.events.send(event);
    }
}

async fn transmit<S: ChatSocket>(socket: &mut S, text: &str) -> Result<(), ChatError> {
    let frame = serde_json::to_string(&OutgoingChat {
        message: text.to_string(),
    })
    .map_err(|e| ChatError::Socket(e.to_string()))?;
    socket.send_text(frame).await
}

fn refuse(command: Command) {
    match command {
        Command::Send { reply, .. } => {
            let _ = reply.send(Err(ChatError::NotConnected));
        }
    }
}
