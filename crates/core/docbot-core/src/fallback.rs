//! Offline replies shown when the chatbot cannot answer
//!
//! The reply is chosen from the kind of failure first. Only when the failure
//! says nothing specific does the user's query pick a topical reply.

use crate::config::ContactInfo;
use crate::DocbotError;

/// Coarse classification of a failed query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Deadline elapsed
    Timeout,
    /// Backend unreachable
    Network,
    /// Backend answered 500
    ServerError,
    /// Anything else
    Other,
}

impl FailureKind {
    /// Classify a client error
    pub fn of(err: &DocbotError) -> Self {
        match err {
            e if e.is_timeout() => FailureKind::Timeout,
            DocbotError::Network(e) if !e.is_decode() => FailureKind::Network,
            DocbotError::Upstream { status: 500, .. } => FailureKind::ServerError,
            _ => FailureKind::Other,
        }
    }

    /// Classify from error text alone
    pub fn from_message(message: &str) -> Self {
        if message.contains("timeout") {
            FailureKind::Timeout
        } else if message.contains("Network") || message.contains("Failed to fetch") {
            FailureKind::Network
        } else if message.contains("500") {
            FailureKind::ServerError
        } else {
            FailureKind::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Greeting,
    Contact,
    Products,
    Pricing,
    Demo,
    General,
}

const TOPICS: [(Topic, &[&str]); 5] = [
    (Topic::Greeting, &["hello", "hi", "hey", "greetings"]),
    (Topic::Contact, &["contact", "phone", "email", "reach"]),
    (Topic::Products, &["product", "solution", "service", "offer"]),
    (Topic::Pricing, &["price", "cost", "quote"]),
    (Topic::Demo, &["demo", "trial", "presentation"]),
];

const UNAVAILABLE: &str =
    "Our AI assistant is temporarily unavailable. For immediate assistance, please contact us directly.";

// Short keywords only count as whole words so "hi" does not fire on "this".
fn mentions(query: &str, keyword: &str) -> bool {
    if keyword.len() > 3 {
        query.contains(keyword)
    } else {
        query
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == keyword)
    }
}

fn topic_of(query: &str) -> Topic {
    let lower = query.to_lowercase();
    TOPICS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| mentions(&lower, k)))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::General)
}

fn direct_contact(contact: &ContactInfo) -> String {
    format!(
        "\n\n**Direct Contact:**\nPhone: {}\nEmail: {}",
        contact.phone, contact.email
    )
}

/// Markdown reply for a failed `query`
pub fn fallback_reply(kind: FailureKind, query: &str, contact: &ContactInfo) -> String {
    let block = direct_contact(contact);
    match kind {
        FailureKind::Timeout => format!(
            "The server is taking longer than usual to respond. Please try again or contact us directly for immediate assistance.{}",
            block
        ),
        FailureKind::Network => format!(
            "Unable to connect to our AI assistant. Please check your internet connection or contact us directly.{}",
            block
        ),
        FailureKind::ServerError => format!("{}{}", UNAVAILABLE, block),
        FailureKind::Other => match topic_of(query) {
            Topic::Greeting => format!(
                "Hello! I'm having trouble connecting to our AI assistant right now, but I'm here to help.\n\n{}{}",
                UNAVAILABLE, block
            ),
            Topic::Contact => format!(
                "**Contact Information:**\nPhone: {}\nEmail: {}\nAddress: {}\n\nFeel free to reach out through any of these channels. We're here to help!",
                contact.phone, contact.email, contact.address
            ),
            Topic::Products => format!(
                "Our team can walk you through our products and services.\n\nOur AI assistant is temporarily unavailable, but you can learn more about our offerings by contacting our sales team directly.{}",
                block
            ),
            Topic::Pricing => format!(
                "For pricing information and custom quotes, please contact our sales team directly.{}\n\nWe'll be happy to discuss your requirements and provide a tailored solution.",
                block
            ),
            Topic::Demo => format!(
                "We'd love to show you a demo of our solutions!\n\nOur AI assistant is temporarily unavailable. Please contact us directly to schedule a demonstration.{}",
                block
            ),
            Topic::General => format!("{}{}", UNAVAILABLE, block),
        },
    }
}
