// src/protocol/mod.rs

//! Wire protocol spoken with the oracle.
//!
//! Every frame is a JSON object with a single key naming the message, e.g.
//! `{"Question": "abc123"}` or `{"Answer": "Good"}`.
//!
//! - [`messages`] defines the inbound and outbound message types.
//! - [`codec`] turns frames into messages and back.

pub mod codec;
pub mod messages;

pub use codec::{decode_client, decode_server, encode_client, encode_server};
pub use messages::{
    ClientMessage, Credentials, DagEntry, InstanceBody, ProblemBody, RepoBody, ServerMessage,
};
