//! In-memory conversation log with a save-time retention cap.

use crate::message::Message;

/// Maximum number of messages kept in durable storage.
///
/// The cap is enforced only when producing the persisted form; the
/// in-memory log may grow past it within a session.
pub const RETENTION_CAP: usize = 50;

/// An ordered, append-only log of panel messages.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the end of the log.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The last [`RETENTION_CAP`] messages in original order.
    ///
    /// This is a pure truncation: entries that fall outside the window
    /// are permanently lost once a save happens.
    pub fn to_persisted(&self) -> &[Message] {
        let start = self.messages.len().saturating_sub(RETENTION_CAP);
        &self.messages[start..]
    }

    /// Replace the log with a previously persisted sequence, verbatim.
    ///
    /// No cap is applied here; persisted data is already within the cap,
    /// and load must never drop entries.
    pub fn load(&mut self, raw: Vec<Message>) {
        self.messages = raw;
    }

    /// All messages in chronological order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the log.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut conv = Conversation::new();
        conv.append(Message::user("one"));
        conv.append(Message::ai("two"));
        conv.append(Message::user("three"));

        let texts: Vec<&str> = conv.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn test_to_persisted_under_cap() {
        let mut conv = Conversation::new();
        for i in 0..10 {
            conv.append(Message::user(format!("msg {i}")));
        }
        assert_eq!(conv.to_persisted().len(), 10);
        assert_eq!(conv.to_persisted()[0].text, "msg 0");
    }

    #[test]
    fn test_to_persisted_truncates_oldest() {
        let mut conv = Conversation::new();
        for i in 0..60 {
            conv.append(Message::user(format!("msg {i}")));
        }

        let persisted = conv.to_persisted();
        assert_eq!(persisted.len(), RETENTION_CAP);
        // Oldest 10 are dropped; order of the rest is unchanged.
        assert_eq!(persisted[0].text, "msg 10");
        assert_eq!(persisted[RETENTION_CAP - 1].text, "msg 59");
    }

    #[test]
    fn test_load_is_verbatim() {
        // Load applies no cap, even on an oversized sequence.
        let raw: Vec<Message> = (0..70).map(|i| Message::ai(format!("m{i}"))).collect();

        let mut conv = Conversation::new();
        conv.append(Message::user("stale"));
        conv.load(raw);

        assert_eq!(conv.len(), 70);
        assert_eq!(conv.messages()[0].text, "m0");
    }

    #[test]
    fn test_persist_then_load_round_trip() {
        let mut conv = Conversation::new();
        for i in 0..60 {
            conv.append(Message::user(format!("msg {i}")));
        }

        let persisted = conv.to_persisted().to_vec();
        let mut restored = Conversation::new();
        restored.load(persisted);

        assert_eq!(restored.len(), RETENTION_CAP);
        assert_eq!(restored.messages(), conv.to_persisted());
    }
}
