use crate::models::{ChatMessage, ContentPart, ImageUrl, MessageContent, Role};

/// Kept short: it is sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a nutrition assistant.
Given one food photo, briefly:
- list foods,
- estimate grams,
- give calories, protein, carbs, fat per item,
- give totals.
Reply in short Markdown. Be concise.
";

pub const USER_INSTRUCTION: &str = "Food photo. Give concise nutrition estimate.";

/// Short per-request instruction, with a `Notes:` suffix when notes are non-blank.
pub fn build_user_instruction(notes: &str) -> String {
    let notes = notes.trim();
    if notes.is_empty() {
        USER_INSTRUCTION.to_string()
    } else {
        format!("{} Notes: {}", USER_INSTRUCTION, notes)
    }
}

pub fn build_messages(instruction: String, image_data_url: String) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: Role::System,
            content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
        },
        ChatMessage {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: instruction },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: image_data_url },
                },
            ]),
        },
    ]
}
