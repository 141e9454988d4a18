//! Tag channel: request/response bridge between the UI and the tag accessor.
//!
//! The UI sends `{ "method": ..., "arguments": {...} }`. Calls are parsed
//! into a [`TagCommand`] first, so malformed or unknown calls are rejected
//! before any filesystem access happens.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tags::{TagAccessor, TagLookup, TagStore, TagWrite};

/// Channel name used by the UI for tag requests
pub const TAG_CHANNEL: &str = "xplor/tags";

pub const GET_TAG: &str = "getTag";
pub const SET_TAG: &str = "setTag";

/// A method invocation as sent by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelErrorCode {
    /// A required argument is missing or not a string
    BadArgs,
    /// The OS rejected a tag write
    TagError,
    /// Unknown method name
    NotImplemented,
}

impl ChannelErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelErrorCode::BadArgs => "bad_args",
            ChannelErrorCode::TagError => "tag_error",
            ChannelErrorCode::NotImplemented => "not_implemented",
        }
    }
}

/// Structured failure returned to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelError {
    pub code: ChannelErrorCode,
    pub message: String,
}

impl ChannelError {
    pub fn bad_args(message: impl Into<String>) -> Self {
        Self {
            code: ChannelErrorCode::BadArgs,
            message: message.into(),
        }
    }

    pub fn tag_error(message: impl Into<String>) -> Self {
        Self {
            code: ChannelErrorCode::TagError,
            message: message.into(),
        }
    }

    pub fn not_implemented(method: &str) -> Self {
        Self {
            code: ChannelErrorCode::NotImplemented,
            message: format!("Method not implemented: {}", method),
        }
    }
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ChannelError {}

/// A well-formed tag request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagCommand {
    Get { path: String },
    Set { path: String, tag: String },
}

impl TagCommand {
    /// Validate a raw call. Arguments that are absent, null or not strings
    /// count as missing.
    pub fn from_call(call: &MethodCall) -> Result<Self, ChannelError> {
        match call.method.as_str() {
            GET_TAG => {
                let path = string_arg(&call.arguments, "path")
                    .ok_or_else(|| ChannelError::bad_args("Missing path"))?;
                Ok(TagCommand::Get { path })
            }
            SET_TAG => {
                match (
                    string_arg(&call.arguments, "path"),
                    string_arg(&call.arguments, "tag"),
                ) {
                    (Some(path), Some(tag)) => Ok(TagCommand::Set { path, tag }),
                    _ => Err(ChannelError::bad_args("Missing path/tag")),
                }
            }
            other => Err(ChannelError::not_implemented(other)),
        }
    }
}

fn string_arg(arguments: &Value, key: &str) -> Option<String> {
    arguments.get(key)?.as_str().map(str::to_owned)
}

/// Run a validated command.
///
/// Replies keep the two-state wire contract: a missing tag and an OS without
/// tag support both answer `null`, and a skipped write still answers `true`.
pub fn dispatch<S: TagStore>(
    accessor: &TagAccessor<S>,
    command: TagCommand,
) -> Result<Value, ChannelError> {
    match command {
        TagCommand::Get { path } => {
            let lookup = accessor.get_tag(Path::new(&path));
            if lookup == TagLookup::Unsupported {
                tracing::debug!(%path, "getTag answered null: tag API unsupported");
            }
            Ok(lookup.into_option().map_or(Value::Null, Value::String))
        }
        TagCommand::Set { path, tag } => match accessor.set_tag(Path::new(&path), &tag) {
            Ok(TagWrite::Written) => Ok(Value::Bool(true)),
            Ok(TagWrite::Skipped) => {
                tracing::debug!(%path, "setTag answered true without writing: tag API unsupported");
                Ok(Value::Bool(true))
            }
            Err(e) => Err(ChannelError::tag_error(e.to_string())),
        },
    }
}

/// Parse and run a raw method call.
pub fn handle_call<S: TagStore>(
    accessor: &TagAccessor<S>,
    call: &MethodCall,
) -> Result<Value, ChannelError> {
    let command = TagCommand::from_call(call).inspect_err(|e| {
        tracing::debug!(method = %call.method, error = %e, "Rejected tag channel call");
    })?;
    dispatch(accessor, command)
}

/// Reply envelope for transports without a native error path:
/// `{ "ok": value }` or `{ "error": { "code", "message" } }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelReply {
    Ok(Value),
    Error(ChannelError),
}

impl ChannelReply {
    pub fn is_error(&self) -> bool {
        matches!(self, ChannelReply::Error(_))
    }
}

impl From<Result<Value, ChannelError>> for ChannelReply {
    fn from(result: Result<Value, ChannelError>) -> Self {
        match result {
            Ok(value) => ChannelReply::Ok(value),
            Err(e) => ChannelReply::Error(e),
        }
    }
}

/// Answer one JSON-encoded method call read from `input`.
///
/// Unreadable input or JSON that is not a method call is `bad_args`.
pub fn reply_for_input<S: TagStore, R: Read>(
    accessor: &TagAccessor<S>,
    mut input: R,
) -> ChannelReply {
    let mut raw = String::new();
    if let Err(e) = input.read_to_string(&mut raw) {
        return ChannelReply::Error(ChannelError::bad_args(format!(
            "Failed to read call: {}",
            e
        )));
    }
    match serde_json::from_str::<MethodCall>(&raw) {
        Ok(call) => ChannelReply::from(handle_call(accessor, &call)),
        Err(e) => ChannelReply::Error(ChannelError::bad_args(format!(
            "Malformed method call: {}",
            e
        ))),
    }
}
