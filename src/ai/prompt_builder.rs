use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};

pub const SYSTEM_PROMPT: &str = "You are a research assistant that writes concise, factual \
    summaries of nonprofit organizations and grant-making foundations. Base every statement on \
    the information provided. When direct information is scarce you may draw careful, clearly \
    hedged inferences from the organization's name and common naming patterns, but never invent \
    figures, locations, or programs.";

/// Context used when the search stage found nothing, so the prompt never
/// carries an empty information section.
#[must_use]
pub fn fallback_context(name: &str) -> String {
    format!(
        "No detailed web information was found for {name}. The organization's name is {name}; \
         infer what you reasonably can from its name and common naming patterns of similar \
         organizations."
    )
}

#[must_use]
pub fn build_user_prompt(name: &str, context: &str) -> String {
    format!(
        "Based on the following information about {name}, write one concise, factual paragraph \
         that covers:\n\
         - Main focus areas and priorities\n\
         - Typical grant size range\n\
         - Geographic focus\n\
         - Distinguishing characteristics or requirements\n\
         \n\
         Information:\n\
         {context}\n\
         \n\
         Do not speculate. Leave out any category the information above does not support \
         rather than guessing. If the information is limited, say so briefly and still return \
         a coherent paragraph with whatever can be stated; do not refuse."
    )
}

#[must_use]
pub fn build_prompt(name: &str, context: &str) -> Vec<ChatCompletionMessage> {
    vec![
        ChatCompletionMessage {
            role: MessageRole::system,
            content: Content::Text(SYSTEM_PROMPT.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
        ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(build_user_prompt(name, context)),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
    ]
}
