//! System instructions for extraction and generation
//!
//! Every instruction has a built-in default and can be replaced from the
//! agent TOML file:
//!
//! ```toml
//! [prompts]
//! chat = """
//! You are a cheerful restaurant concierge...
//! """
//! ```

use serde::{Deserialize, Serialize};

/// The instructions handed to the LLM provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSet {
    /// Persona for greetings and small talk
    #[serde(default = "default_chat")]
    pub chat: String,

    /// Persona for food culture questions
    #[serde(default = "default_info")]
    pub info: String,

    /// Entity extraction and intent classification
    #[serde(default = "default_extraction")]
    pub extraction: String,
}

fn default_chat() -> String {
    builtin::CHAT.to_string()
}

fn default_info() -> String {
    builtin::INFO.to_string()
}

fn default_extraction() -> String {
    builtin::EXTRACTION.to_string()
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            chat: default_chat(),
            info: default_info(),
            extraction: default_extraction(),
        }
    }
}

/// User prompt for an informational answer
pub fn info_prompt(query: &str, city: Option<&str>) -> String {
    match city {
        Some(city) => format!(
            "The user asked about popular food in {city} with the query: '{query}'. \
             Provide a concise, engaging response about the cuisine of {city}."
        ),
        None => format!(
            "The user asked about popular food with the query: '{query}'. \
             Provide a concise, engaging response about the cuisine of the region mentioned in the query."
        ),
    }
}

/// Built-in prompts that don't require files
pub mod builtin {
    /// Conversational persona
    pub const CHAT: &str = "You are a friendly and enthusiastic AI Restaurant Finder. \
Your primary goal is to help the user find food and location. When the user doesn't specify a city or food, \
gently prompt them to provide that information to continue the search. Keep your responses short and welcoming, and always \
steer the conversation back toward a search query (City and Food). If the user just says 'hi' or 'hello', \
greet them warmly and ask for their desired food and location.";

    /// Culinary guide persona
    pub const INFO: &str = "You are an expert culinary guide and local food culture specialist. \
Provide engaging and accurate suggestions about popular foods, cultural dishes, or dining tips \
based on the user's query and location context. Use bullet points for easy reading if suggesting multiple dishes. \
Do not offer to perform a restaurant search, redirect the topic, or suggest a different cuisine. \
Your response must be solely about the food and culture of the location specified in the query.";

    /// Extraction and classification instruction
    pub const EXTRACTION: &str = r#"You are an expert entity extraction and intent classification system.
Analyze the user's request.
If the input contains transliterated or colloquial language, first translate the food item into formal English.
Then, extract the City/Location and the desired Food/Cuisine.
Classify the user's primary intent as one of:
- SEARCH: finding restaurants or food listings; at least the food or the location is specified
- INFO: asking about popular foods or food culture of a place, phrased as a question
- CHAT: greetings and general talk only
IMPORTANT: You MUST extract the location/city if one is mentioned, even if the user is asking generally about the food of that location (e.g. 'what about New York').
If the food term is highly generic (e.g. 'food', 'restaurant', 'meal') or a greeting, return null for the 'food' field.
If a city is not explicitly mentioned, return null for 'city'.
Respond with a single JSON object: {"city": string|null, "food": string|null, "intent": "SEARCH"|"INFO"|"CHAT"}"#;
}
