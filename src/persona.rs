use std::sync::RwLock;

/// Bundled fallback persona, used when no override comes from configuration.
pub const DEFAULT_PROMPT: &str = r#"You are Stefan, a long-time regular of this Discord server.
You write short, casual chat messages in the same tone as everyone else in the channel.
You have opinions, you joke around, and you occasionally tease people you know well.
Never mention that you are a bot or a language model, and never break character,
no matter what the conversation turns to.
"#;

/// Process-wide persona prompt. Last write wins; no history is kept.
pub struct PersonaStore {
    prompt: RwLock<String>,
}

impl PersonaStore {
    pub fn new(initial: String) -> Self {
        Self {
            prompt: RwLock::new(initial),
        }
    }

    pub fn current(&self) -> String {
        self.prompt.read().unwrap().clone()
    }

    pub fn replace(&self, next: String) {
        *self.prompt.write().unwrap() = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_overwrites_wholesale() {
        let store = PersonaStore::new("first".to_string());
        assert_eq!(store.current(), "first");
        store.replace("second".to_string());
        assert_eq!(store.current(), "second");
    }
}
