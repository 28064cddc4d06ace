use chrono::{TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use terrigraphic::chat::{classify, Category, Chatbot, ResponseBook, Sender};

#[test]
fn classifies_reference_inputs() {
    assert_eq!(classify("hi there"), Category::Greeting);
    assert_eq!(
        classify("tell me about your portfolio projects"),
        Category::Portfolio
    );
    assert_eq!(classify("what languages do you speak?"), Category::Default);
    assert_eq!(classify("Do you use Three.js?"), Category::Skills);
    assert_eq!(classify("how can I reach you"), Category::Contact);
}

#[test]
fn every_category_has_candidates() {
    let book = ResponseBook::default();
    let mut rng = StdRng::seed_from_u64(3);
    for category in Category::ALL {
        assert!(!book.candidates(category).is_empty());
        let reply = book.respond(category, &mut rng);
        assert!(book.candidates(category).iter().any(|c| c == reply));
    }
}

#[test]
fn custom_book_replaces_defaults() {
    let json = r#"{
        "greeting": ["yo"],
        "portfolio": ["see the gallery"],
        "skills": ["rust"],
        "contact": ["use the form"],
        "default": ["hmm"]
    }"#;
    let book = ResponseBook::from_json(json).unwrap();
    let now = Utc::now();
    let mut bot = Chatbot::new(book, StdRng::seed_from_u64(1), now);
    let delay = bot.send("hello", now).unwrap();
    let due = now + TimeDelta::from_std(delay).unwrap();
    let reply = bot.poll(due).unwrap();
    assert_eq!(reply.text, "yo");
}

#[test]
fn transcript_is_ordered() {
    let now = Utc::now();
    let mut bot = Chatbot::new(ResponseBook::default(), StdRng::seed_from_u64(9), now);
    for (i, text) in ["hello", "which projects?", "email?"].iter().enumerate() {
        let at = now + TimeDelta::seconds(i as i64 * 5);
        bot.send(text, at).unwrap();
        bot.deliver(at + TimeDelta::seconds(2)).unwrap();
    }
    let messages = bot.transcript().messages();
    assert_eq!(messages.len(), 7);
    for (i, pair) in messages.windows(2).enumerate() {
        assert_eq!(pair[0].id + 1, pair[1].id, "at {i}");
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
    let senders: Vec<_> = messages.iter().map(|m| m.sender).collect();
    assert_eq!(senders[0], Sender::Bot);
    assert_eq!(senders[1], Sender::User);
    assert_eq!(senders[2], Sender::Bot);
}
