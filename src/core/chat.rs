//! Chat relay: wraps a conversation in the assistant instructions, forwards
//! it to a [`ChatModel`] and reduces the outcome to a single answer string.

use crate::core::analytics::RangeTotals;
use crate::core::kpi::format_currency;
use crate::core::model::{Business, null_as_default};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

pub const NO_QUESTION: &str = "No question provided.";
pub const INVALID_RESPONSE: &str = "AI did not return a valid response.";
pub const INTERNAL_ERROR: &str = "Internal server error.";

const INSTRUCTIONS: &[&str] = &[
    "You are a friendly financial assistant. Use the following rules:",
    "- Consider the user's businesses and assets to be the only ones they have.",
    "- Use simple, clear language.",
    "- Serious financial questions: concise but complete, you have the permission to use emojis",
    "- Always respond in the same language as the question.",
    "- Please list all the items in a single line each, starting with a dash '-'.",
    "- Use Markdown to make text bold",
    "- The user may have no businesses or budgets, adapt your answers accordingly",
    "- The user may only have budgets and goals, to manage their personal finance",
    "- You can give general advice about personal finance, budgeting, saving, investing, and business management",
    "- You can match the user's goals with their businesses to give tailored advice",
    "- The user's budgeting covers their goals and saving plans",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Anything other than `assistant`, including a missing role, is the user.
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /ask`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub businesses: Option<String>,
    #[serde(default)]
    pub budgets: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One conversation turn in the upstream wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns `Ok(None)` when the model answered without usable text.
    async fn generate(&self, contents: &[Content]) -> Result<Option<String>>;
}

/// Outcome of one relayed question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answered(String),
    NoQuestion,
    InvalidResponse,
    Failed,
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Answered(answer) => answer,
            Reply::NoQuestion => NO_QUESTION,
            Reply::InvalidResponse => INVALID_RESPONSE,
            Reply::Failed => INTERNAL_ERROR,
        }
    }
}

pub struct ChatRelay {
    model: Arc<dyn ChatModel>,
    assistant_name: String,
}

impl ChatRelay {
    pub fn new(model: Arc<dyn ChatModel>, assistant_name: impl Into<String>) -> Self {
        Self {
            model,
            assistant_name: assistant_name.into(),
        }
    }

    /// The instruction turn followed by the conversation history, with
    /// `assistant` turns mapped to the model role.
    pub fn build_contents(&self, request: &AskRequest) -> Vec<Content> {
        let mut parts: Vec<Part> = INSTRUCTIONS
            .iter()
            .map(|text| Part {
                text: text.to_string(),
            })
            .collect();
        parts.push(Part {
            text: format!(
                "- Your name is {} (don't mention it until the user asks), the user may already know your name.",
                self.assistant_name
            ),
        });
        parts.push(Part {
            text: format!("- User budgeting/goals: {}", or_none(&request.budgets)),
        });
        parts.push(Part {
            text: format!("- User businesses: {}", or_none(&request.businesses)),
        });

        let mut contents = vec![Content {
            role: Role::Model,
            parts,
        }];
        contents.extend(request.history.iter().flatten().map(|message| Content {
            role: if message.role == "assistant" {
                Role::Model
            } else {
                Role::User
            },
            parts: vec![Part {
                text: message.content.clone(),
            }],
        }));
        contents
    }

    pub async fn ask(&self, request: &AskRequest) -> Reply {
        let turns = request.history.as_ref().map_or(0, Vec::len);
        if turns == 0 {
            return Reply::NoQuestion;
        }
        debug!("Relaying conversation with {turns} turns");

        let contents = self.build_contents(request);
        match self.model.generate(&contents).await {
            Ok(Some(answer)) => Reply::Answered(answer.trim().to_string()),
            Ok(None) => Reply::InvalidResponse,
            Err(e) => {
                error!(error = ?e, "Error fetching answer from the language model");
                Reply::Failed
            }
        }
    }
}

/// Free-text snapshot of the stored businesses for the assistant, or `None`
/// when there are none.
pub fn describe_businesses(businesses: &[Business], currency: &str) -> Option<String> {
    if businesses.is_empty() {
        return None;
    }
    let lines: Vec<String> = businesses
        .iter()
        .map(|business| {
            let totals = RangeTotals::of(&business.entries);
            format!(
                "{}: {} entries, revenue {}, expenses {}, net {}",
                business.name,
                totals.count,
                format_currency(totals.revenue, currency),
                format_currency(totals.expense, currency),
                format_currency(totals.revenue - totals.expense, currency),
            )
        })
        .collect();
    Some(lines.join("; "))
}

fn or_none(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("none")
}
