use std::env;

pub struct Config {
    pub discord_token: String,
    pub openai_api_key: String,
    pub openai_endpoint: String,
    pub openai_model: String,
    pub admin_user_id: Option<u64>,
    pub persona_prompt: Option<String>,
    pub persona_name: String,
    pub response_chance: f64,
    pub cooldown_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let discord_token = lookup("DISCORD_TOKEN").ok_or("DISCORD_TOKEN must be set")?;
        let openai_api_key = lookup("OPENAI_API_KEY").ok_or("OPENAI_API_KEY must be set")?;

        let openai_endpoint =
            lookup("OPENAI_ENDPOINT").unwrap_or_else(|| "https://api.openai.com".to_string());
        let openai_model =
            lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo-0613".to_string());

        let admin_user_id = match lookup("ADMIN_USER_ID") {
            Some(raw) => Some(raw.parse()?),
            None => None,
        };
        let persona_prompt = lookup("PERSON_PROMPT");
        let persona_name = lookup("FAKE_PERSON_NAME").unwrap_or_else(|| "Stefan".to_string());

        let response_chance = match lookup("RESPONSE_CHANCE") {
            Some(raw) => raw.parse()?,
            None => 0.1,
        };
        let cooldown_ms = match lookup("COOLDOWN_MS") {
            Some(raw) => raw.parse()?,
            None => 1000,
        };

        Ok(Self {
            discord_token,
            openai_api_key,
            openai_endpoint,
            openai_model,
            admin_user_id,
            persona_prompt,
            persona_name,
            response_chance,
            cooldown_ms,
        })
    }
}
