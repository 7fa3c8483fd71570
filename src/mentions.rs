//! Mention codec: translates between platform mention tokens and plain
//! `@name` text. Encoding runs while building the transcript (ids to names),
//! decoding runs on the generated reply before posting (names back to ids).
//!
//! Known limitation: the decode pattern only matches word characters, so
//! display names containing spaces or punctuation are never decoded. They
//! pass through unchanged, which is the intended behavior.

use regex_lite::{Captures, Regex};
use std::collections::HashMap;

/// Lookup capability over the platform's user/role directories.
pub trait Directory: Send + Sync {
    fn user_name(&self, id: u64) -> Option<String>;
    fn user_id(&self, name: &str) -> Option<u64>;
    fn role_name(&self, id: u64) -> Option<String>;
}

/// Replaces user and role mention tokens with `@name` text.
///
/// Handles both the plain `<@id>` and nickname `<@!id>` user forms, then
/// role tokens `<@&id>`. Unresolvable ids are left untouched.
pub fn encode(text: &str, directory: &dyn Directory) -> String {
    let mut result = text.to_string();

    if let Ok(re) = Regex::new(r"<@!?(\d+)>") {
        result = re
            .replace_all(&result, |caps: &Captures| {
                let id = caps[1].parse::<u64>().ok();
                match id.and_then(|id| directory.user_name(id)) {
                    Some(name) => format!("@{}", name),
                    None => caps[0].to_string(),
                }
            })
            .to_string();
    }

    if let Ok(re) = Regex::new(r"<@&(\d+)>") {
        result = re
            .replace_all(&result, |caps: &Captures| {
                let id = caps[1].parse::<u64>().ok();
                match id.and_then(|id| directory.role_name(id)) {
                    Some(name) => format!("@{}", name),
                    None => caps[0].to_string(),
                }
            })
            .to_string();
    }

    result
}

/// Replaces `@name` text with canonical user mention tokens.
///
/// First member whose name matches wins when several share a name.
/// Unresolvable names are left untouched.
pub fn decode(text: &str, directory: &dyn Directory) -> String {
    match Regex::new(r"@(\w+)") {
        Ok(re) => re
            .replace_all(text, |caps: &Captures| match directory.user_id(&caps[1]) {
                Some(id) => format!("<@{}>", id),
                None => caps[0].to_string(),
            })
            .to_string(),
        Err(_) => text.to_string(),
    }
}

/// Point-in-time directory assembled from the platform cache and the fetched
/// message window, so the codec never reaches into live client state.
#[derive(Default)]
pub struct DirectorySnapshot {
    user_names: HashMap<u64, String>,
    user_ids: HashMap<String, u64>,
    role_names: HashMap<u64, String>,
}

impl DirectorySnapshot {
    pub fn add_user(&mut self, id: u64, name: &str) {
        self.user_names.entry(id).or_insert_with(|| name.to_string());
        self.user_ids.entry(name.to_string()).or_insert(id);
    }

    pub fn add_role(&mut self, id: u64, name: &str) {
        self.role_names.entry(id).or_insert_with(|| name.to_string());
    }
}

impl Directory for DirectorySnapshot {
    fn user_name(&self, id: u64) -> Option<String> {
        self.user_names.get(&id).cloned()
    }

    fn user_id(&self, name: &str) -> Option<u64> {
        self.user_ids.get(name).copied()
    }

    fn role_name(&self, id: u64) -> Option<String> {
        self.role_names.get(&id).cloned()
    }
}
