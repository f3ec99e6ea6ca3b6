//! Canned commands and the documented example exchange

use crate::client::{HEALTH_PATH, PROCESS_PATH};
use crate::ApiConfig;
use serde_json::{json, Value};

/// A ready-made command and the language it is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleCommand {
    pub text: &'static str,
    pub language: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SampleCategory {
    pub name: &'static str,
    pub commands: &'static [SampleCommand],
}

const fn sample(text: &'static str, language: &'static str) -> SampleCommand {
    SampleCommand { text, language }
}

pub const CATEGORIES: &[SampleCategory] = &[
    SampleCategory {
        name: "Inventory Queries",
        commands: &[
            sample("Show my inventory", "English"),
            sample("मेरा स्टॉक दिखाओ", "Hindi"),
            sample("Stock dikhao", "Hinglish"),
            sample("Show low stock items", "English"),
        ],
    },
    SampleCategory {
        name: "Order Queries",
        commands: &[
            sample("Show my orders", "English"),
            sample("मेरे ऑर्डर दिखाओ", "Hindi"),
            sample("Last 5 orders dikhao", "Hinglish"),
            sample("Show pending orders", "English"),
        ],
    },
    SampleCategory {
        name: "Inventory Updates",
        commands: &[
            sample("Add 10 units of product ABC123", "English"),
            sample("प्रोडक्ट XYZ789 में 5 यूनिट जोड़ें", "Hindi"),
            sample("Update stock of DEF456 to 20 units", "English"),
        ],
    },
    SampleCategory {
        name: "Reports",
        commands: &[
            sample("Show sales report", "English"),
            sample("पिछले महीने का रिपोर्ट दिखाओ", "Hindi"),
            sample("Top products report dikhao", "Hinglish"),
        ],
    },
];

/// Every sample in display order; `:sample <n>` indexes this from 1
pub fn all_commands() -> impl Iterator<Item = &'static SampleCommand> {
    CATEGORIES.iter().flat_map(|c| c.commands.iter())
}

/// 1-based lookup into [`all_commands`]
pub fn command(number: usize) -> Option<&'static SampleCommand> {
    number.checked_sub(1).and_then(|i| all_commands().nth(i))
}

pub fn example_request() -> Value {
    json!({
        "message": "Show my inventory",
        "language_preference": null
    })
}

pub fn example_response() -> Value {
    json!({
        "detected_language": "en",
        "intent": "inventory_query",
        "entities": {
            "product_id": null,
            "quantity": null,
            "date_range": null
        },
        "confidence": 0.95,
        "rule_based_intent": "inventory_query",
        "ml_intent": "inventory_query",
        "rule_based_confidence": 0.9,
        "ml_confidence": 0.98,
        "response": "Here is your current inventory: \
                     Product A: 25 units, Product B: 10 units, Product C: 15 units."
    })
}

/// `(label, url)` pairs for the endpoints the console uses
pub fn endpoint_urls(config: &ApiConfig) -> [(&'static str, String); 2] {
    [
        ("Process", config.endpoint(PROCESS_PATH)),
        ("Health", config.endpoint(HEALTH_PATH)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CommandResult;

    #[test]
    fn test_sample_numbering() {
        assert_eq!(all_commands().count(), 14);
        assert_eq!(command(1).unwrap().text, "Show my inventory");
        assert_eq!(command(14).unwrap().text, "Top products report dikhao");
        assert_eq!(command(0), None);
        assert_eq!(command(15), None);
    }

    #[test]
    fn test_every_language_represented() {
        for language in ["English", "Hindi", "Hinglish"] {
            assert!(all_commands().any(|c| c.language == language));
        }
    }

    #[test]
    fn test_example_response_normalizes() {
        let result = CommandResult::from_response(&example_response());
        assert_eq!(result.intent, "inventory_query");
        assert_eq!(result.entities.len(), 3);
        assert!(result.response_text.starts_with("Here is your current inventory"));
    }

    #[test]
    fn test_endpoint_urls() {
        let urls = endpoint_urls(&ApiConfig::with_base_url("http://localhost:5000/"));
        assert_eq!(urls[0].1, "http://localhost:5000/api/process");
        assert_eq!(urls[1].1, "http://localhost:5000/api/health");
    }
}
