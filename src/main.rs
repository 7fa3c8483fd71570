mod bot;
mod config;
mod extractor;
mod mentions;
mod models;
mod openai;
mod persona;
mod rate_limiter;
mod transcript;

use crate::bot::Handler;
use crate::config::Config;
use crate::openai::OpenAiClient;
use crate::persona::{PersonaStore, DEFAULT_PROMPT};
use crate::rate_limiter::RateLimiter;
use dotenv::dotenv;
use serenity::all::{Client, GatewayIntents};
use tracing::error;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("invalid configuration");

    let generator = OpenAiClient::new(
        &config.openai_endpoint,
        &config.openai_api_key,
        &config.openai_model,
    );
    let persona = PersonaStore::new(
        config
            .persona_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
    );
    let limiter = RateLimiter::new(config.cooldown_ms);

    let handler = Handler::new(
        Box::new(generator),
        persona,
        limiter,
        config.persona_name.clone(),
        config.admin_user_id,
        config.response_chance,
    );

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .expect("failed to build Discord client");

    if let Err(e) = client.start().await {
        error!("Discord client stopped: {}", e);
    }
}
