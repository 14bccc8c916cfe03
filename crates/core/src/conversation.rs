//! Conversation assembly.
//!
//! The store returns a flat, timestamp-ascending list of everything a
//! user has sent or received. [`assemble`] partitions that list into
//! the two-party thread a client actually renders. It is a pure
//! function with no hidden state, so callers can re-run it on every
//! render or poll.

use crate::message::Message;
use crate::types::Username;

/// Derive the conversation between `me` and `peer` from a flat message
/// list.
///
/// Keeps messages whose `{sender, receiver}` pair equals `{me, peer}`
/// in either order, preserving input order (the store already
/// guarantees timestamp-ascending). When `text_filter` is non-empty,
/// further restricts to messages whose text or attachment filename
/// contains the filter, case-insensitively.
#[must_use]
pub fn assemble(
    all: &[Message],
    me: &Username,
    peer: &Username,
    text_filter: Option<&str>,
) -> Vec<Message> {
    let filter = text_filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase);

    all.iter()
        .filter(|m| m.is_between(me, peer))
        .filter(|m| match &filter {
            Some(needle) => matches_filter(m, needle),
            None => true,
        })
        .cloned()
        .collect()
}

/// Case-insensitive substring match over message text and attachment
/// name. `needle` must already be lowercased.
fn matches_filter(message: &Message, needle: &str) -> bool {
    let text_hit = message
        .message_text
        .as_deref()
        .is_some_and(|t| t.to_lowercase().contains(needle));
    let name_hit = message
        .file
        .as_ref()
        .is_some_and(|f| f.name.to_lowercase().contains(needle));
    text_hit || name_hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Attachment;
    use crate::types::MessageId;
    use chrono::{TimeZone, Utc};

    fn msg(id: &str, from: &str, to: &str, text: Option<&str>, file_name: Option<&str>) -> Message {
        Message {
            id: MessageId::new(id),
            sender_username: Username::new(from),
            receiver_username: Username::new(to),
            message_text: text.map(String::from),
            file: file_name.map(|name| Attachment {
                url: format!("http://localhost:8080/uploads/{name}"),
                name: name.to_owned(),
                content_type: "application/pdf".into(),
                size_bytes: 1024,
            }),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn thread() -> Vec<Message> {
        vec![
            msg("1", "alice", "bob", Some("hi there"), None),
            msg("2", "bob", "alice", Some("goodbye"), None),
            msg("3", "alice", "carol", Some("hi carol"), None),
            msg("4", "alice", "bob", None, Some("hidden.pdf")),
        ]
    }

    #[test]
    fn keeps_only_the_pair_in_input_order() {
        let all = thread();
        let convo = assemble(&all, &Username::new("alice"), &Username::new("bob"), None);
        let ids: Vec<_> = convo.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "4"]);
    }

    #[test]
    fn pair_match_is_symmetric() {
        let all = thread();
        let a = assemble(&all, &Username::new("alice"), &Username::new("bob"), None);
        let b = assemble(&all, &Username::new("bob"), &Username::new("alice"), None);
        let a_ids: Vec<_> = a.iter().map(|m| m.id.as_str()).collect();
        let b_ids: Vec<_> = b.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(a_ids, b_ids);
    }

    #[test]
    fn is_idempotent() {
        let all = thread();
        let me = Username::new("alice");
        let peer = Username::new("bob");
        let first = assemble(&all, &me, &peer, Some("hi"));
        let second = assemble(&all, &me, &peer, Some("hi"));
        let first_ids: Vec<_> = first.iter().map(|m| m.id.as_str()).collect();
        let second_ids: Vec<_> = second.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn filter_matches_text_and_attachment_name() {
        let all = thread();
        let convo = assemble(
            &all,
            &Username::new("alice"),
            &Username::new("bob"),
            Some("hi"),
        );
        // "hi there" and "hidden.pdf" match; "goodbye" does not.
        let ids: Vec<_> = convo.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["1", "4"]);
    }

    #[test]
    fn filter_is_case_insensitive() {
        let all = thread();
        let convo = assemble(
            &all,
            &Username::new("alice"),
            &Username::new("bob"),
            Some("HI"),
        );
        assert_eq!(convo.len(), 2);
    }

    #[test]
    fn blank_filter_means_no_filter() {
        let all = thread();
        let none = assemble(&all, &Username::new("alice"), &Username::new("bob"), None);
        let blank = assemble(
            &all,
            &Username::new("alice"),
            &Username::new("bob"),
            Some("   "),
        );
        assert_eq!(none.len(), blank.len());
    }
}
