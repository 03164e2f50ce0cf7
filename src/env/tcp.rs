use std::{
    io::{Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use log::{debug, info};
use serde::Deserialize;

use super::Environment;
use crate::error::EnvError;

/// Port the platform game server listens on by default
pub const DEFAULT_PORT: u16 = 2037;

const CHUNK: usize = 1024;

/// A reward may arrive as a bare number or as a quoted string
#[derive(Deserialize)]
#[serde(untagged)]
enum WireReward {
    Number(f64),
    Text(String),
}

/// One reply from the game server
#[derive(Deserialize)]
struct Reply {
    estado: String,
    recompensa: WireReward,
}

/// [`Environment`] backed by a TCP connection to the platform game server
///
/// The server answers every action name with a dict literal such as
/// `{'estado': '0b0000101', 'recompensa': -14}`, possibly split across several reads.
pub struct TcpEnvironment {
    stream: TcpStream,
    buffer: Vec<u8>,
}

impl TcpEnvironment {
    /// Connect to the game server at `addr`
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, EnvError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        info!("connected to environment at {}", stream.peer_addr()?);
        Ok(Self {
            stream,
            buffer: Vec::with_capacity(CHUNK),
        })
    }

    /// Connect to the game server on `localhost` at [`DEFAULT_PORT`]
    pub fn connect_local() -> Result<Self, EnvError> {
        Self::connect(("127.0.0.1", DEFAULT_PORT))
    }

    /// Fail reads that block longer than `timeout`; `None` blocks forever
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<(), EnvError> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    fn read_reply(&mut self) -> Result<Reply, EnvError> {
        self.buffer.clear();
        let mut chunk = [0u8; CHUNK];
        loop {
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(EnvError::Disconnected);
            }
            self.buffer.extend_from_slice(&chunk[..n]);
            match parse_reply(&self.buffer) {
                Ok(reply) => return Ok(reply),
                Err(ParseOutcome::Incomplete) => continue,
                Err(ParseOutcome::Invalid(reason)) => {
                    return Err(EnvError::MalformedReply {
                        reply: String::from_utf8_lossy(&self.buffer).into_owned(),
                        reason,
                    })
                }
            }
        }
    }
}

impl Environment for TcpEnvironment {
    fn exchange(&mut self, action: &str) -> Result<(String, String), EnvError> {
        self.stream.write_all(action.as_bytes())?;
        let reply = self.read_reply()?;
        let reward = match reply.recompensa {
            WireReward::Number(r) => r.to_string(),
            WireReward::Text(r) => r,
        };
        debug!("{action} -> state {} reward {reward}", reply.estado);
        Ok((reply.estado, reward))
    }
}

enum ParseOutcome {
    Incomplete,
    Invalid(String),
}

fn parse_reply(bytes: &[u8]) -> Result<Reply, ParseOutcome> {
    let text = std::str::from_utf8(bytes).map_err(|e| match e.error_len() {
        // a multi-byte character cut off by the end of the read
        None => ParseOutcome::Incomplete,
        Some(_) => ParseOutcome::Invalid(e.to_string()),
    })?;
    let normalized = text.trim().replace('\'', "\"");
    serde_json::from_str(&normalized).map_err(|e| {
        if e.is_eof() {
            ParseOutcome::Incomplete
        } else {
            ParseOutcome::Invalid(e.to_string())
        }
    })
}
