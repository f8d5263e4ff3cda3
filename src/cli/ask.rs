use super::ui;
use crate::core::chat::{AskRequest, ChatMessage, ChatRelay, Reply, describe_businesses};
use crate::core::model::Business;
use anyhow::{Result, bail};

/// Relays one question with a snapshot of the stored businesses and prints
/// the answer.
pub async fn run(
    relay: &ChatRelay,
    businesses: &[Business],
    question: &str,
    budgets: Option<String>,
    currency: &str,
) -> Result<()> {
    if question.trim().is_empty() {
        bail!("Enter a question");
    }
    let request = AskRequest {
        history: Some(vec![ChatMessage::user(question)]),
        businesses: describe_businesses(businesses, currency),
        budgets,
    };

    let spinner = ui::new_spinner("Asking the assistant...");
    let reply = relay.ask(&request).await;
    spinner.finish_and_clear();

    match reply {
        Reply::Answered(answer) => println!("{answer}"),
        other => println!("{}", ui::style_text(other.text(), ui::StyleType::Error)),
    }
    Ok(())
}
