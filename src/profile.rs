//! Agent behavior profile: system prompt, greeting, and tool bindings.
//!
//! The prompt is the only channel through which the platform's dialogue
//! engine learns when to call the showtimes tool and how to map phrases to
//! its four parameters.  It is a contract written in prose, not incidental
//! copy, so it lives here as a checked constant next to the tool schema.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Display name the agent is registered under.
pub const AGENT_NAME: &str = "Miami Theater Voice Assistant";

const FIRST_MESSAGE: &str = "Hi! I'm your Miami theater assistant. I can help you \
    find movie showtimes at local theaters. What would you like to know about \
    current movies and showtimes?";

const SYSTEM_PROMPT: &str = r#"You are a helpful Miami theater assistant specializing in movie showtimes.

Your primary function is to help users find movie showtimes at Miami theaters using the Miami Theater Showtimes tool.

Key capabilities:
- Search by specific date (e.g., "What's playing on January 15th?")
- Search by movie title (e.g., "When is Spider-Man playing?")
- Quick day filters (today, tomorrow, weekend)
- Time preferences (afternoon, evening, night shows)

Guidelines:
1. Always use the Miami Theater Showtimes tool to get current, accurate information
2. If a user asks about showtimes, determine what type of search they want:
   - Specific movie? Use movie_title parameter
   - Specific date? Use date parameter (YYYY-MM-DD format)
   - Today/tomorrow/weekend? Use day_type parameter
   - Preference for time of day? Add time_preference parameter
3. Present results in a natural, conversational way
4. Include relevant details like theater location, rating, and special formats
5. If no results found, suggest alternatives or ask for clarification

Example interactions:
- "What movies are playing tonight?" → Use day_type=today, time_preference=evening
- "When is The Substance showing?" → Use movie_title=The Substance
- "What's playing this weekend?" → Use day_type=weekend
- "Any afternoon shows tomorrow?" → Use day_type=tomorrow, time_preference=afternoon

Always be friendly, helpful, and provide clear information about Miami theater showtimes."#;

/// Behavior contract for the conversational agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub system_prompt: String,
    pub first_message: String,
    /// Tool ids the prompt may invoke, in binding order.
    pub bound_tool_ids: Vec<String>,
}

impl AgentProfile {
    /// Render the platform registration payload
    /// (`conversation_config.agent.prompt` nesting).
    pub fn registration_body(&self) -> Value {
        json!({
            "name": self.name,
            "conversation_config": {
                "agent": {
                    "prompt": {
                        "prompt": self.system_prompt,
                        "tools": self.bound_tool_ids,
                    },
                    "first_message": self.first_message,
                },
            },
        })
    }
}

/// Build the showtimes agent profile, bound to `tool_id` when one is given.
pub fn showtimes_agent(tool_id: Option<&str>) -> AgentProfile {
    AgentProfile {
        name: AGENT_NAME.to_string(),
        system_prompt: SYSTEM_PROMPT.to_string(),
        first_message: FIRST_MESSAGE.to_string(),
        bound_tool_ids: tool_id.map(|id| vec![id.to_string()]).unwrap_or_default(),
    }
}
