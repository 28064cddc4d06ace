//! Keyword intent classification and canned responses.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Topic bucket a user message falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Greeting,
    Portfolio,
    Skills,
    Contact,
    Default,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Greeting,
        Category::Portfolio,
        Category::Skills,
        Category::Contact,
        Category::Default,
    ];
}

/// A named project the bot answers with a fixed description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectTopic {
    ChatApp,
    ThreeDArt,
    VrMuseum,
}

impl ProjectTopic {
    pub fn reply(self) -> &'static str {
        match self {
            ProjectTopic::ChatApp => "The Real-time Chat Application is one of the featured projects! It includes video calls, file sharing, and real-time messaging using React, Socket.io, Node.js, and WebRTC. Pretty cool, right?",
            ProjectTopic::ThreeDArt => "The 3D art projects are amazing! From interactive particle systems to geometric art generators, all created with Three.js and WebGL. Which 3D project interests you most?",
            ProjectTopic::VrMuseum => "The VR Museum Experience is currently in progress! It's an immersive virtual reality tour with interactive exhibits built using A-Frame and WebXR. Exciting stuff!",
        }
    }
}

/// Result of matching one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Category(Category),
    Topic(ProjectTopic),
}

impl Intent {
    pub fn category(self) -> Category {
        match self {
            Intent::Category(category) => category,
            Intent::Topic(_) => Category::Portfolio,
        }
    }
}

// Priority order; the first rule with a keyword contained in the message wins.
// "hi" is a plain substring test, so "this" or "which" count as greetings.
const RULES: &[(Intent, &[&str])] = &[
    (Intent::Category(Category::Greeting), &["hello", "hi", "hey"]),
    (
        Intent::Category(Category::Portfolio),
        &["portfolio", "project", "work"],
    ),
    (
        Intent::Category(Category::Skills),
        &["skill", "technology", "tech", "react", "three"],
    ),
    (
        Intent::Category(Category::Contact),
        &["contact", "reach", "email"],
    ),
    (Intent::Topic(ProjectTopic::ChatApp), &["chat", "real-time"]),
    (Intent::Topic(ProjectTopic::ThreeDArt), &["3d", "art"]),
    (
        Intent::Topic(ProjectTopic::VrMuseum),
        &["vr", "virtual reality"],
    ),
];

pub fn match_intent(text: &str) -> Intent {
    let message = text.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| message.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Category(Category::Default))
}

/// Category of `text`; always terminates with at least [`Category::Default`].
pub fn classify(text: &str) -> Category {
    match_intent(text).category()
}

/// Candidate replies per category. Every category holds at least one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseBook {
    responses: HashMap<Category, Vec<String>>,
}

impl Default for ResponseBook {
    fn default() -> Self {
        let table: [(Category, &[&str]); 5] = [
            (
                Category::Greeting,
                &[
                    "Hello! Welcome to Terrigraphic's portfolio. What would you like to know?",
                    "Hi there! I'm here to help you explore Terrigraphic's work. What interests you?",
                    "Hey! Thanks for visiting. How can I assist you today?",
                ],
            ),
            (
                Category::Portfolio,
                &[
                    "Terrigraphic specializes in 3D art, web development, digital design, and interactive media. Which area interests you most?",
                    "The portfolio includes 8 amazing projects ranging from React applications to VR experiences. Would you like details about any specific project?",
                    "You can explore projects in Web Development, 3D Art, Digital Design, and Interactive categories. What catches your eye?",
                ],
            ),
            (
                Category::Skills,
                &[
                    "Terrigraphic's expertise includes React, TypeScript, Three.js, Node.js, WebGL, and many creative tools. Any specific technology you'd like to know about?",
                    "The skill set covers both technical development (React, Three.js, WebGL) and creative design (3D modeling, motion graphics). What interests you?",
                    "From full-stack development to 3D art creation, there's a wide range of capabilities. Which area would you like to explore?",
                ],
            ),
            (
                Category::Contact,
                &[
                    "You can reach out through the contact form on this website, or connect on social media. Would you like me to guide you to the contact page?",
                    "For collaborations or inquiries, the contact section has all the details. Shall I help you get there?",
                    "Feel free to get in touch for any projects or questions. The contact form is just a click away!",
                ],
            ),
            (
                Category::Default,
                &[
                    "That's an interesting question! Could you tell me more about what you're looking for?",
                    "I'd love to help! Can you be more specific about what you'd like to know?",
                    "Great question! What aspect of Terrigraphic's work are you most curious about?",
                ],
            ),
        ];
        Self {
            responses: table
                .into_iter()
                .map(|(category, lines)| {
                    (category, lines.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
        }
    }
}

impl ResponseBook {
    /// Builds a book, rejecting it unless every category has a candidate.
    pub fn new(responses: HashMap<Category, Vec<String>>) -> Result<Self> {
        for category in Category::ALL {
            if responses.get(&category).map_or(true, Vec::is_empty) {
                return Err(Error::EmptyResponses(category));
            }
        }
        Ok(Self { responses })
    }

    /// Parses `{"greeting": [...], "portfolio": [...], ...}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let responses: HashMap<Category, Vec<String>> = serde_json::from_str(json)?;
        Self::new(responses)
    }

    pub fn candidates(&self, category: Category) -> &[String] {
        self.responses
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Uniformly samples one candidate for `category`. Repeats are allowed.
    pub fn respond<R: Rng + ?Sized>(&self, category: Category, rng: &mut R) -> &str {
        self.candidates(category)
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Full reply to `text`: topic replies are fixed, categories are sampled.
    pub fn reply<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> (Category, String) {
        let intent = match_intent(text);
        let reply = match intent {
            Intent::Topic(topic) => topic.reply().to_string(),
            Intent::Category(category) => self.respond(category, rng).to_string(),
        };
        (intent.category(), reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn first_match_wins() {
        // "react" is a skills keyword, checked before the chat-app topic.
        assert_eq!(match_intent("react chat"), Intent::Category(Category::Skills));
        assert_eq!(match_intent("real-time chat?"), Intent::Topic(ProjectTopic::ChatApp));
        assert_eq!(match_intent("VR demo"), Intent::Topic(ProjectTopic::VrMuseum));
        assert_eq!(classify("HEY"), Category::Greeting);
    }

    #[test]
    fn default_book_is_complete() {
        let book = ResponseBook::default();
        for category in Category::ALL {
            assert_eq!(book.candidates(category).len(), 3);
        }
    }

    #[test]
    fn empty_category_is_rejected() {
        let json = r#"{"greeting":["a"],"portfolio":["b"],"skills":["c"],"contact":[],"default":["e"]}"#;
        assert!(matches!(
            ResponseBook::from_json(json),
            Err(Error::EmptyResponses(Category::Contact))
        ));
        let missing = r#"{"greeting":["a"]}"#;
        assert!(matches!(
            ResponseBook::from_json(missing),
            Err(Error::EmptyResponses(_))
        ));
        assert!(matches!(
            ResponseBook::from_json("not json"),
            Err(Error::ResponseBook(_))
        ));
    }

    #[test]
    fn topic_reply_is_fixed() {
        let book = ResponseBook::default();
        let mut rng = StdRng::seed_from_u64(0);
        let (category, reply) = book.reply("show me 3d stuff", &mut rng);
        assert_eq!(category, Category::Portfolio);
        assert_eq!(reply, ProjectTopic::ThreeDArt.reply());
    }
}
