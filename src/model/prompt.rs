use serde::Serialize;

use crate::web::models::{IncomingReplyRequest, Message, Role};

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that drafts professional email replies. Be concise and polite.";

/// The two messages sent to the model: fixed instructions, then the email itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChatPrompt {
    messages: Vec<Message>,
}

pub fn build_prompt(req: &IncomingReplyRequest) -> ChatPrompt {
    // The "---" fences keep the quoted body apart from our instructions
    let mut user_content = format!(
        "The following is an email from {} (email: {}) with the subject '{}' and body:\n\n---\n{}\n---\n\nDraft a concise and polite reply. Start the reply with 'Dear {},'",
        req.sender_name,
        req.sender_email.as_deref().unwrap_or(""),
        req.subject,
        req.body,
        req.sender_name,
    );

    if let Some(recipient) = &req.recipient_name {
        user_content.push_str(&format!("\n\nSign off as {}.", recipient));
    }

    ChatPrompt {
        messages: vec![
            Message {
                role: Role::System,
                content: SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: Role::User,
                content: user_content,
            },
        ],
    }
}
