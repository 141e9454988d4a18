//! Tag Tauri Commands
//!
//! Exposes the tag channel to the frontend. The accessor is managed state
//! so every invocation shares one capability check.

use serde_json::Value;
use tauri::State;

use crate::channel::{self, ChannelError, MethodCall, TagCommand};
use crate::tags::TagAccessor;

/// Tag accessor managed by Tauri
pub type TagState = TagAccessor;

/// Generic entry point mirroring the `xplor/tags` method channel
#[tauri::command]
pub fn tag_channel(call: MethodCall, tags: State<'_, TagState>) -> Result<Value, ChannelError> {
    channel::handle_call(tags.inner(), &call)
}

/// Read the first Finder tag of a path (`null` when there is none)
#[tauri::command]
pub fn get_tag(path: String, tags: State<'_, TagState>) -> Result<Option<String>, ChannelError> {
    let value = channel::dispatch(tags.inner(), TagCommand::Get { path })?;
    Ok(value.as_str().map(str::to_owned))
}

/// Replace the Finder tags of a path with `tag` (blank clears them)
#[tauri::command]
pub fn set_tag(path: String, tag: String, tags: State<'_, TagState>) -> Result<bool, ChannelError> {
    channel::dispatch(tags.inner(), TagCommand::Set { path, tag })?;
    Ok(true)
}
