//! Rule-based chatbot: intent classification, response sampling and the
//! conversation transcript.

mod classifier;
mod session;
mod transcript;

pub use classifier::{classify, match_intent, Category, Intent, ProjectTopic, ResponseBook};
pub use session::{Chatbot, GREETING, QUICK_ACTIONS};
pub use transcript::{ChatMessage, Sender, Transcript};
