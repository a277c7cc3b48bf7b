pub mod codec;

use std::fmt::Debug;

use color_eyre::eyre::Error;
use futures_lite::StreamExt;
use futures_util::SinkExt;
use tokio::{
    io::{
        AsyncRead,
        AsyncWrite,
    },
    net::{
        TcpStream,
        ToSocketAddrs,
    },
};
use tokio_util::codec::Framed;

use crate::codec::{
    MAX_REQUEST_BODY,
    Packet,
    PacketType,
    RconCodec,
};

#[derive(Clone, Debug, thiserror::Error)]
pub enum RconError {
    #[error("RCON authentication failed")]
    AuthenticationFailed,

    #[error("RCON connection closed by server")]
    ConnectionClosed,

    #[error("Command too long: {0} bytes (maximum is {max})", max = MAX_REQUEST_BODY)]
    CommandTooLong(usize),
}

/// Client for a server's remote console.
///
/// Requests are answered strictly in order, so a client is used by one task at a time.
#[derive(Debug)]
pub struct RconClient<S = TcpStream> {
    framed: Framed<S, RconCodec>,
    next_id: i32,
}

impl RconClient<TcpStream> {
    pub async fn connect<A>(address: A, password: &str) -> Result<Self, Error>
    where
        A: ToSocketAddrs + Debug,
    {
        let stream = TcpStream::connect(&address).await?;
        tracing::info!(?address, "connected");

        let mut client = Self::new(stream);
        client.login(password).await?;

        Ok(client)
    }
}

impl<S> RconClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            framed: Framed::new(stream, RconCodec),
            next_id: 1,
        }
    }

    pub async fn login(&mut self, password: &str) -> Result<(), Error> {
        let id = self.next_id();
        self.framed
            .send(Packet::new(id, PacketType::Login, password))
            .await?;

        loop {
            let packet = self.receive().await?;

            // some servers send an empty response ahead of the authentication result
            if packet.kind != PacketType::Command {
                continue;
            }

            if packet.id == id {
                tracing::debug!("authenticated");
                return Ok(());
            }
            else {
                return Err(RconError::AuthenticationFailed.into());
            }
        }
    }

    /// Runs `command` and returns the complete reply.
    ///
    /// Replies longer than one packet arrive in fragments. A second packet is sent right after
    /// the command and the fragments are collected until the answer to that packet comes back.
    pub async fn execute(&mut self, command: &str) -> Result<String, Error> {
        if command.len() > MAX_REQUEST_BODY {
            return Err(RconError::CommandTooLong(command.len()).into());
        }

        let id = self.next_id();
        let sentinel = self.next_id();

        self.framed
            .feed(Packet::new(id, PacketType::Command, command))
            .await?;
        self.framed
            .send(Packet::new(sentinel, PacketType::Response, ""))
            .await?;

        let mut reply = String::new();
        loop {
            let packet = self.receive().await?;

            if packet.id == sentinel {
                break;
            }
            else if packet.id == id {
                reply.push_str(&packet.body);
            }
            else {
                tracing::warn!(id = packet.id, "ignoring response to unknown request");
            }
        }

        tracing::trace!(command, reply, "executed");

        Ok(reply)
    }

    async fn receive(&mut self) -> Result<Packet, Error> {
        Ok(self
            .framed
            .try_next()
            .await?
            .ok_or(RconError::ConnectionClosed)?)
    }

    fn next_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = id.checked_add(1).unwrap_or(1);
        id
    }
}
