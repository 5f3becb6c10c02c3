//! Ready-made update predicates for message and callback routes

use std::sync::Arc;

use regex::Regex;

use crate::core::types::InboundUpdate;

pub type Predicate = Arc<dyn Fn(&InboundUpdate) -> bool + Send + Sync>;

/// Any text message
pub fn any_text() -> impl Fn(&InboundUpdate) -> bool + Send + Sync + 'static {
    |update: &InboundUpdate| update.text().is_some()
}

pub fn text_eq(expected: impl Into<String>) -> impl Fn(&InboundUpdate) -> bool + Send + Sync + 'static {
    let expected = expected.into();
    move |update: &InboundUpdate| update.text() == Some(expected.as_str())
}

pub fn text_contains(needle: impl Into<String>) -> impl Fn(&InboundUpdate) -> bool + Send + Sync + 'static {
    let needle = needle.into();
    move |update: &InboundUpdate| update.text().is_some_and(|text| text.contains(needle.as_str()))
}

pub fn text_matches(pattern: Regex) -> impl Fn(&InboundUpdate) -> bool + Send + Sync + 'static {
    move |update: &InboundUpdate| update.text().is_some_and(|text| pattern.is_match(text))
}

pub fn callback_eq(expected: impl Into<String>) -> impl Fn(&InboundUpdate) -> bool + Send + Sync + 'static {
    let expected = expected.into();
    move |update: &InboundUpdate| update.callback_data() == Some(expected.as_str())
}

pub fn callback_prefix(prefix: impl Into<String>) -> impl Fn(&InboundUpdate) -> bool + Send + Sync + 'static {
    let prefix = prefix.into();
    move |update: &InboundUpdate| {
        update
            .callback_data()
            .is_some_and(|data| data.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Sender;

    fn text(body: &str) -> InboundUpdate {
        InboundUpdate::private_text(Sender::new(1, "A"), 1, body)
    }

    fn press(data: &str) -> InboundUpdate {
        InboundUpdate::private_callback(Sender::new(1, "A"), "cb", data)
    }

    #[test]
    fn test_text_predicates() {
        assert!(text_eq("hi")(&text("hi")));
        assert!(!text_eq("hi")(&text("hi there")));
        assert!(text_contains("secure")(&text("is this secure?")));
        assert!(!text_contains("secure")(&press("secure")));
        assert!(text_matches(Regex::new(r"^\d+$").unwrap())(&text("123")));
        assert!(any_text()(&text("")));
        assert!(!any_text()(&press("x")));
    }

    #[test]
    fn test_callback_predicates() {
        assert!(callback_eq("say_hi")(&press("say_hi")));
        assert!(!callback_eq("say_hi")(&text("say_hi")));
        assert!(callback_prefix("page:")(&press("page:2")));
        assert!(!callback_prefix("page:")(&press("pages")));
    }
}
