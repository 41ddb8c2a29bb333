//! Message planning: caption wraparound and contact × message plans.
//!
//! CHANGELOG:
//! - 10/15/2026 - Added SendPlan for dry-run previews
//! - 10/14/2026 - Initial implementation

use crate::contacts::Contact;
use crate::error::{Result, SenderError};
use serde::Serialize;
use std::path::PathBuf;
use tracing::error;

/// A single message to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    Text { text: String },
    Image { path: PathBuf, caption: String },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text { text: text.into() }
    }

    pub fn image(path: impl Into<PathBuf>, caption: impl Into<String>) -> Self {
        Message::Image {
            path: path.into(),
            caption: caption.into(),
        }
    }

    /// Short human label for logs.
    pub fn describe(&self) -> String {
        match self {
            Message::Text { text } => format!("text ({} chars)", text.chars().count()),
            Message::Image { path, .. } => format!("image {}", path.display()),
        }
    }
}

/// Wrap a list of texts into text messages.
pub fn text_messages<S: AsRef<str>>(texts: &[S]) -> Vec<Message> {
    texts.iter().map(|t| Message::text(t.as_ref())).collect()
}

/// Pair every image with a caption, cycling captions when images outnumber them.
///
/// Image `i` gets `captions[i % captions.len()]`. An empty caption list is
/// rejected up front, even with no images.
pub fn pair_captions<S: AsRef<str>>(images: &[PathBuf], captions: &[S]) -> Result<Vec<Message>> {
    if captions.is_empty() {
        error!("Cannot pair {} images with an empty caption list.", images.len());
        return Err(SenderError::EmptyCaptionSet);
    }

    Ok(images
        .iter()
        .enumerate()
        .map(|(i, image)| Message::image(image.clone(), captions[i % captions.len()].as_ref()))
        .collect())
}

/// One planned send.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedSend {
    pub contact: Contact,
    pub message: Message,
}

/// Ordered list of sends, contact-major.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendPlan {
    pub sends: Vec<PlannedSend>,
}

impl SendPlan {
    /// Every contact receives every message, contacts in order.
    pub fn cross(contacts: &[Contact], messages: &[Message]) -> Self {
        let sends = contacts
            .iter()
            .flat_map(|contact| {
                messages.iter().map(move |message| PlannedSend {
                    contact: contact.clone(),
                    message: message.clone(),
                })
            })
            .collect();
        Self { sends }
    }

    pub fn len(&self) -> usize {
        self.sends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captions_of(messages: &[Message]) -> Vec<(String, String)> {
        messages
            .iter()
            .map(|m| match m {
                Message::Image { path, caption } => (path.display().to_string(), caption.clone()),
                Message::Text { .. } => panic!("expected image message"),
            })
            .collect()
    }

    #[test]
    fn test_caption_wraparound() {
        let images: Vec<PathBuf> = ["i0", "i1", "i2", "i3"].iter().map(PathBuf::from).collect();
        let paired = pair_captions(&images, &["c0", "c1"]).unwrap();
        let pairs = captions_of(&paired);
        let expected: Vec<(String, String)> = [("i0", "c0"), ("i1", "c1"), ("i2", "c0"), ("i3", "c1")]
            .iter()
            .map(|(i, c)| (i.to_string(), c.to_string()))
            .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_more_captions_than_images() {
        let images = vec![PathBuf::from("only.jpg")];
        let paired = pair_captions(&images, &["first", "second", "third"]).unwrap();
        assert_eq!(paired, vec![Message::image("only.jpg", "first")]);
    }

    #[test]
    fn test_empty_captions_rejected() {
        let images = vec![PathBuf::from("a.jpg")];
        let empty: [&str; 0] = [];
        assert!(matches!(
            pair_captions(&images, &empty),
            Err(SenderError::EmptyCaptionSet)
        ));
        assert!(matches!(
            pair_captions(&[], &empty),
            Err(SenderError::EmptyCaptionSet)
        ));
    }

    #[test]
    fn test_cross_plan_is_contact_major() {
        let contacts = vec![
            Contact::parse("+14155550001").unwrap(),
            Contact::parse("+14155550002").unwrap(),
        ];
        let messages = text_messages(&["m1", "m2"]);
        let plan = SendPlan::cross(&contacts, &messages);

        let order: Vec<(&str, &Message)> = plan
            .sends
            .iter()
            .map(|s| (s.contact.phone(), &s.message))
            .collect();
        assert_eq!(
            order,
            vec![
                ("+14155550001", &messages[0]),
                ("+14155550001", &messages[1]),
                ("+14155550002", &messages[0]),
                ("+14155550002", &messages[1]),
            ]
        );
    }

    #[test]
    fn test_message_serializes_with_kind() {
        let json = serde_json::to_value(Message::text("hi")).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["text"], "hi");
    }
}
