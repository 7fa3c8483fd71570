use crate::extractor;
use crate::mentions::{self, Directory, DirectorySnapshot};
use crate::openai::Generate;
use crate::persona::PersonaStore;
use crate::rate_limiter::RateLimiter;
use crate::transcript::{self, HistoryMessage};
use serenity::all::{Context, EventHandler, GetMessages, Message, Ready};
use serenity::async_trait;
use tracing::{debug, error, info};

/// Operator prefix that replaces the persona prompt.
pub const PROMPT_MARKER: &str = "!prompt";

pub struct Handler {
    generator: Box<dyn Generate>,
    persona: PersonaStore,
    limiter: RateLimiter,
    persona_name: String,
    admin_user_id: Option<u64>,
    response_chance: f64,
}

impl Handler {
    pub fn new(
        generator: Box<dyn Generate>,
        persona: PersonaStore,
        limiter: RateLimiter,
        persona_name: String,
        admin_user_id: Option<u64>,
        response_chance: f64,
    ) -> Self {
        Self {
            generator,
            persona,
            limiter,
            persona_name,
            admin_user_id,
            response_chance,
        }
    }

    fn is_operator(&self, author_id: u64) -> bool {
        self.admin_user_id == Some(author_id)
    }

    async fn respond(
        &self,
        ctx: &Context,
        msg: &Message,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let builder = GetMessages::new().limit(transcript::HISTORY_LIMIT);
        let window = msg.channel_id.messages(&ctx.http, builder).await?;

        let directory = snapshot_directory(ctx, &window);
        let history: Vec<HistoryMessage> = window.iter().map(history_view).collect();
        let bot_name = ctx.cache.current_user().name.clone();

        compose_reply(
            &history,
            &self.persona.current(),
            &self.persona_name,
            &bot_name,
            self.admin_user_id,
            &directory,
            self.generator.as_ref(),
        )
        .await
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Operator command: swap the persona prompt and acknowledge.
        if self.is_operator(msg.author.id.get()) && msg.content.starts_with(PROMPT_MARKER) {
            let next = msg
                .content
                .strip_prefix(PROMPT_MARKER)
                .unwrap_or_default()
                .trim_start()
                .to_string();
            self.persona.replace(next.clone());
            info!("Persona prompt replaced by operator");
            if let Err(e) = msg
                .channel_id
                .say(&ctx.http, format!("Prompt changed to: {}", next))
                .await
            {
                error!("Failed to acknowledge prompt change: {}", e);
            }
            return;
        }

        // Redacted messages never trigger a response.
        if msg.content.starts_with(transcript::HIDE_MARKER) {
            return;
        }

        let bot_id = ctx.cache.current_user().id;
        let mentioned = msg.mentions.iter().any(|user| user.id == bot_id);
        if !(rand::random::<f64>() < self.response_chance || mentioned) {
            debug!("Ignored message");
            return;
        }

        if msg.author.id == bot_id {
            return;
        }
        if let Err(remaining) = self.limiter.check_and_update() {
            debug!("Rate gate active, {} ms remaining", remaining);
            return;
        }

        if let Err(e) = msg.channel_id.broadcast_typing(&ctx.http).await {
            debug!("Typing indicator failed: {}", e);
        }

        match self.respond(&ctx, &msg).await {
            Ok(reply) => {
                info!("Posting generated reply");
                if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
                    error!("Failed to send reply: {}", e);
                }
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                // The marker keeps the error itself out of future transcripts.
                let notice = format!("{} {}", transcript::HIDE_MARKER, e);
                if let Err(send_err) = msg.channel_id.say(&ctx.http, notice).await {
                    error!("Failed to surface error in channel: {}", send_err);
                }
            }
        }
    }
}

/// The fetch-to-send pipeline between gateway plumbing and the remote call:
/// build transcript, generate, extract, decode. Any failure short-circuits
/// to the caller's error surfacing.
async fn compose_reply(
    window: &[HistoryMessage],
    persona_prompt: &str,
    persona_name: &str,
    bot_name: &str,
    operator_id: Option<u64>,
    directory: &dyn Directory,
    generator: &dyn Generate,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let prompt_body = transcript::build(
        window,
        persona_prompt,
        persona_name,
        bot_name,
        operator_id,
        directory,
    );
    let completion = generator.generate(persona_prompt, &prompt_body).await?;
    debug!("Raw completion: {}", completion);

    let reply = extractor::extract_reply(&completion);
    if reply.is_empty() {
        return Err("No response from OpenAI".into());
    }

    Ok(mentions::decode(&reply, directory))
}

fn history_view(message: &Message) -> HistoryMessage {
    HistoryMessage {
        author_id: message.author.id.get(),
        author_name: message.author.name.clone(),
        content: message.content.clone(),
        created_at: chrono::DateTime::from_timestamp(message.timestamp.unix_timestamp(), 0)
            .unwrap_or_default(),
        attachment_url: message.attachments.first().map(|a| a.url.clone()),
    }
}

/// Directory view for the codec: role and member names from the first cached
/// guild, plus every author and mentioned user seen in the fetched window.
fn snapshot_directory(ctx: &Context, window: &[Message]) -> DirectorySnapshot {
    let mut directory = DirectorySnapshot::default();

    if let Some(guild_id) = ctx.cache.guilds().first().copied() {
        if let Some(guild) = ctx.cache.guild(guild_id) {
            for (role_id, role) in &guild.roles {
                directory.add_role(role_id.get(), &role.name);
            }
            for (user_id, member) in &guild.members {
                directory.add_user(user_id.get(), &member.user.name);
            }
        }
    }

    for message in window {
        directory.add_user(message.author.id.get(), &message.author.name);
        for user in &message.mentions {
            directory.add_user(user.id.get(), &user.name);
        }
    }

    directory
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    struct CannedGenerator {
        completion: String,
    }

    #[async_trait]
    impl Generate for CannedGenerator {
        async fn generate(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.completion.clone())
        }
    }

    fn history() -> Vec<HistoryMessage> {
        ["third", "second", "first"]
            .iter()
            .enumerate()
            .map(|(i, content)| HistoryMessage {
                author_id: 100 + i as u64,
                author_name: format!("user{}", i),
                content: content.to_string(),
                created_at: Utc.with_ymd_and_hms(2023, 7, 3, 12, 3 - i as u32, 0).unwrap(),
                attachment_url: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn pipeline_posts_extracted_and_decoded_reply() {
        let mut directory = DirectorySnapshot::default();
        directory.add_user(111, "alice");
        let generator = CannedGenerator {
            completion: "Date: Mon Jul 03 2023, time: 12:04:00 @bot: \"Hej!\"".to_string(),
        };
        let limiter = RateLimiter::new(1000);

        let accepted_after = Utc::now();
        assert!(limiter.check_and_update().is_ok());
        let accepted_before = Utc::now();
        let reply = compose_reply(
            &history(),
            "persona prompt",
            "Stefan",
            "bot",
            None,
            &directory,
            &generator,
        )
        .await
        .unwrap();

        assert_eq!(reply, "Hej!");
        let dispatched = limiter.last_dispatch().unwrap();
        assert!(dispatched >= accepted_after && dispatched <= accepted_before);
    }

    #[tokio::test]
    async fn reply_mentions_are_decoded_before_posting() {
        let mut directory = DirectorySnapshot::default();
        directory.add_user(111, "alice");
        let generator = CannedGenerator {
            completion: "@bot: \"hello @alice\"".to_string(),
        };

        let reply = compose_reply(
            &history(),
            "persona",
            "Stefan",
            "bot",
            None,
            &directory,
            &generator,
        )
        .await
        .unwrap();

        assert_eq!(reply, "hello <@111>");
    }

    #[tokio::test]
    async fn completion_without_quoted_segment_is_a_failure() {
        let directory = DirectorySnapshot::default();
        let generator = CannedGenerator {
            completion: "no quoted segment here".to_string(),
        };

        let err = compose_reply(
            &history(),
            "persona",
            "Stefan",
            "bot",
            None,
            &directory,
            &generator,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "No response from OpenAI");
    }

    #[test]
    fn two_events_inside_the_interval_dispatch_once() {
        let limiter = RateLimiter::new(1000);
        let dispatched = [limiter.check_and_update(), limiter.check_and_update()]
            .iter()
            .filter(|outcome| outcome.is_ok())
            .count();
        assert_eq!(dispatched, 1);
    }
}
