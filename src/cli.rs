//! Command implementations behind the `xplor-tags` binary.
//!
//! Each command returns what to print instead of printing it, so the
//! binary stays a thin argument parser.

use std::io::Read;
use std::path::Path;

use crate::channel::{self, ChannelError};
use crate::tags::{TagAccessor, TagError, TagLookup, TagStore, TagWrite};

/// Text for stdout/stderr and whether the process should exit successfully
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }
    }

    fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }

    fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.stderr = notice.into();
        self
    }
}

/// `get PATH`: the tag on its own line, nothing when untagged.
pub fn get<S: TagStore>(tags: &TagAccessor<S>, path: &Path) -> CommandOutput {
    let lookup = tags.get_tag(path);
    let unsupported = lookup == TagLookup::Unsupported;
    let output = match lookup.into_option() {
        Some(tag) => CommandOutput::ok(format!("{}\n", tag)),
        None => CommandOutput::ok(""),
    };
    if unsupported {
        output.with_notice(format!("{}\n", TagError::Unsupported))
    } else {
        output
    }
}

/// `set PATH TAG`: `true` on success, a `tag_error` line on failure.
pub fn set<S: TagStore>(tags: &TagAccessor<S>, path: &Path, tag: &str) -> CommandOutput {
    match tags.set_tag(path, tag) {
        Ok(TagWrite::Written) => CommandOutput::ok("true\n"),
        Ok(TagWrite::Skipped) => CommandOutput::ok("true\n")
            .with_notice(format!("{}; nothing written\n", TagError::Unsupported)),
        Err(e) => CommandOutput::failed(format!("{}\n", ChannelError::tag_error(e.to_string()))),
    }
}

/// `call`: one JSON method call from `input`, the JSON reply envelope out.
pub fn call<S: TagStore, R: Read>(tags: &TagAccessor<S>, input: R) -> CommandOutput {
    let reply = channel::reply_for_input(tags, input);
    match serde_json::to_string(&reply) {
        Ok(json) => CommandOutput {
            stdout: format!("{}\n", json),
            stderr: String::new(),
            success: !reply.is_error(),
        },
        Err(e) => CommandOutput::failed(format!("Failed to encode reply: {}\n", e)),
    }
}
