// src/protocol/messages.rs

use serde::{Deserialize, Serialize};

use crate::dag::Node;
use crate::engine::{SessionCommand, SessionEvent, Verdict};

/// One `[node, [parents...]]` entry of a DAG listing.
pub type DagEntry = (Node, Vec<Node>);

/// Messages sent by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// A repository DAG that the following instances refer to.
    Repo(RepoBody),
    /// A bisection instance on the last repository.
    Instance(InstanceBody),
    /// Repository and instance in one message.
    Problem(ProblemBody),
    Answer(Verdict),
    /// Final score; the payload is only logged.
    Score(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoBody {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<u64>,
    pub dag: Vec<DagEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceBody {
    pub good: Node,
    pub bad: Node,
}

/// Combined repository + instance, also used as the local problem file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub good: Node,
    pub bad: Node,
    pub dag: Vec<DagEntry>,
}

impl ServerMessage {
    /// Split a message into the session events it stands for.
    pub fn into_events(self) -> Vec<SessionEvent> {
        match self {
            ServerMessage::Repo(repo) => vec![SessionEvent::Repository {
                name: repo.name,
                dag: repo.dag,
            }],
            ServerMessage::Instance(instance) => vec![SessionEvent::Instance {
                good: instance.good,
                bad: instance.bad,
            }],
            ServerMessage::Problem(problem) => vec![
                SessionEvent::Repository {
                    name: problem.name.unwrap_or_else(|| "problem".to_string()),
                    dag: problem.dag,
                },
                SessionEvent::Instance {
                    good: problem.good,
                    bad: problem.bad,
                },
            ],
            ServerMessage::Answer(verdict) => vec![SessionEvent::Answer(verdict)],
            ServerMessage::Score(_) => vec![SessionEvent::Score],
        }
    }
}

/// Messages sent to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Identity announcement, sent once after connecting.
    User(Credentials),
    Question(Node),
    Solution(Node),
}

impl ClientMessage {
    /// Wire message for a session command; `Close` has none.
    pub fn from_command(command: &SessionCommand) -> Option<Self> {
        match command {
            SessionCommand::Ask(node) => Some(ClientMessage::Question(node.clone())),
            SessionCommand::Solve(node) => Some(ClientMessage::Solution(node.clone())),
            SessionCommand::Close => None,
        }
    }
}

/// `"id"` or `["id", "token"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Credentials {
    Id(String),
    IdWithToken(String, String),
}

impl Credentials {
    pub fn new(user: impl Into<String>, token: Option<String>) -> Self {
        match token {
            Some(token) => Credentials::IdWithToken(user.into(), token),
            None => Credentials::Id(user.into()),
        }
    }

    pub fn user(&self) -> &str {
        match self {
            Credentials::Id(user) | Credentials::IdWithToken(user, _) => user,
        }
    }
}
