use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Category, ChatMessage, ResponseBook, Sender, Transcript};
use crate::{Error, Result};

pub const GREETING: &str = "Hi! I'm Terrigraphic's AI assistant. How can I help you today?";

pub const QUICK_ACTIONS: [&str; 4] = [
    "Tell me about the portfolio",
    "What technologies are used?",
    "How can I contact?",
    "Show me 3D projects",
];

const MIN_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone)]
struct PendingReply {
    text: String,
    category: Category,
    due: DateTime<Utc>,
}

/// One conversation with the bot.
///
/// A reply is picked as soon as the user sends, then held back for a
/// simulated typing delay. Further input is refused until it is delivered.
pub struct Chatbot {
    transcript: Transcript,
    book: ResponseBook,
    pending: Option<PendingReply>,
    rng: StdRng,
}

impl Default for Chatbot {
    fn default() -> Self {
        Self::new(ResponseBook::default(), StdRng::from_entropy(), Utc::now())
    }
}

impl Chatbot {
    pub fn new(book: ResponseBook, rng: StdRng, now: DateTime<Utc>) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Sender::Bot, GREETING, now);
        Self {
            transcript,
            book,
            pending: None,
            rng,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_typing(&self) -> bool {
        self.pending.is_some()
    }

    /// Suggested openers, offered only before the user has said anything.
    pub fn quick_actions(&self) -> &'static [&'static str] {
        if self.transcript.len() == 1 {
            &QUICK_ACTIONS
        } else {
            &[]
        }
    }

    /// Appends the user's message and schedules the reply. Returns how long
    /// to wait before the reply is due.
    pub fn send(&mut self, text: &str, now: DateTime<Utc>) -> Result<Duration> {
        if text.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }
        if self.pending.is_some() {
            tracing::warn!("message rejected while a reply is pending");
            return Err(Error::ReplyPending);
        }
        self.transcript.push(Sender::User, text, now);
        let (category, reply) = self.book.reply(text, &mut self.rng);
        let delay = Duration::from_millis(self.rng.gen_range(MIN_DELAY_MS..MAX_DELAY_MS));
        let due = now + TimeDelta::from_std(delay).unwrap_or_else(|_| TimeDelta::seconds(1));
        tracing::debug!(?category, delay_ms = delay.as_millis() as u64, "reply scheduled");
        self.pending = Some(PendingReply {
            text: reply,
            category,
            due,
        });
        Ok(delay)
    }

    /// Delivers the pending reply if it is due at `now`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<&ChatMessage> {
        let due = self.pending.as_ref()?.due;
        if due <= now {
            self.deliver(now)
        } else {
            None
        }
    }

    /// Delivers the pending reply regardless of its due time. Used by hosts
    /// that already waited out the delay with their own timer.
    pub fn deliver(&mut self, now: DateTime<Utc>) -> Option<&ChatMessage> {
        let pending = self.pending.take()?;
        tracing::debug!(category = ?pending.category, "reply delivered");
        Some(self.transcript.push(Sender::Bot, pending.text, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot() -> (Chatbot, DateTime<Utc>) {
        let now = Utc::now();
        (
            Chatbot::new(ResponseBook::default(), StdRng::seed_from_u64(4), now),
            now,
        )
    }

    #[test]
    fn starts_with_greeting_and_quick_actions() {
        let (bot, _) = bot();
        let first = &bot.transcript().messages()[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.sender, Sender::Bot);
        assert_eq!(first.text, GREETING);
        assert_eq!(bot.quick_actions().len(), 4);
    }

    #[test]
    fn reply_waits_for_delay() {
        let (mut bot, now) = bot();
        let delay = bot.send("hello", now).unwrap();
        assert!(delay >= Duration::from_millis(1000) && delay < Duration::from_millis(2000));
        assert!(bot.is_typing());
        assert!(bot.quick_actions().is_empty());

        assert!(bot.poll(now + TimeDelta::milliseconds(999)).is_none());
        assert!(matches!(bot.send("again", now), Err(Error::ReplyPending)));

        let reply = bot.poll(now + TimeDelta::seconds(2)).unwrap();
        assert_eq!(reply.sender, Sender::Bot);
        assert_eq!(reply.id, 3);
        assert!(!bot.is_typing());
    }

    #[test]
    fn blank_input_is_rejected() {
        let (mut bot, now) = bot();
        assert!(matches!(bot.send("   \n", now), Err(Error::EmptyMessage)));
        assert_eq!(bot.transcript().len(), 1);
        assert!(bot.deliver(now).is_none());
    }
}
