//! User-facing reply text for the search branch

use reqwest::Url;

use crate::providers::{Business, SearchError};

use super::memory::title_case;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

pub const CHAT_APOLOGY: &str = "I seem to be having trouble connecting to the chat service right now. \
Please try a food and location search.";

pub const INFO_APOLOGY: &str = "I'm having trouble retrieving culinary information right now. \
Please try a specific food or location search.";

/// Google Maps search link for a business in a city
pub fn map_link(name: &str, city: &str) -> String {
    let query = format!("{}, {}", name, city);
    match Url::parse_with_params(MAPS_SEARCH_URL, &[("api", "1"), ("query", query.as_str())]) {
        Ok(url) => url.to_string(),
        // MAPS_SEARCH_URL is a valid absolute URL, so this arm is unreachable in practice
        Err(_) => MAPS_SEARCH_URL.to_string(),
    }
}

/// Numbered list of up to `limit` businesses
pub fn search_results(food: &str, city: &str, businesses: &[Business], limit: usize) -> String {
    let mut lines = vec![format!(
        "Here are the top {} restaurants in {}:",
        title_case(food),
        city
    )];
    for (i, business) in businesses.iter().take(limit).enumerate() {
        lines.push(format!(
            "{}. [{}]({}) | ⭐ **{:.1}** | 📍 {}",
            i + 1,
            business.name,
            map_link(&business.name, city),
            business.rating,
            business.address
        ));
    }
    lines.join("\n")
}

pub fn no_results(food: &str, city: &str) -> String {
    format!("No {} restaurants found in {}.", title_case(food), city)
}

pub fn missing_food(city: &str) -> String {
    format!(
        "I've noted the location as **{}**. Now, what type of cuisine or dish would you like to search for?",
        city
    )
}

pub fn missing_city(food: &str) -> String {
    format!(
        "Nice! You're looking for **{}**, but I need a location. Which city should I search in?",
        title_case(food)
    )
}

pub fn missing_both() -> String {
    "Please tell me at least a city or a food you want, e.g. 'sushi in Tokyo'.".to_string()
}

/// Conversational message for a failed search
pub fn search_failure(error: &SearchError, food: &str, city: &str) -> String {
    match error {
        SearchError::MissingCredentials => "I need a valid **YELP_API_KEY** to perform the search. \
Please add your Yelp API key to the configuration to continue."
            .to_string(),
        SearchError::Rejected { .. } => format!(
            "I'm sorry, I couldn't find any results for **{}** in **{}**. \
The search service might not have data for that location or cuisine. \
Could you try a different city or a more general food type? (e.g. 'Pizza in London, UK')",
            title_case(food),
            city
        ),
        SearchError::Service { status, detail } => format!(
            "Uh oh! I ran into a service issue while searching. The search service reported: *{} ({})*. \
Please try again shortly.",
            detail, status
        ),
        SearchError::Transport(detail) => format!(
            "Uh oh! I couldn't reach the search service ({}). Please try again shortly.",
            detail
        ),
        SearchError::Other(detail) => format!(
            "Hmm, an unexpected error occurred: *{}*. Could you rephrase your request?",
            detail
        ),
    }
}
