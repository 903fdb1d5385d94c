use serde::{Deserialize, Serialize};

/// Push notification templates, rendered server-side and shipped to the
/// relay as plain title/body strings. One dispatch surface, polymorphic
/// only over the template kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    NewMatch,
    SuperLiked,
}

impl NotificationTemplate {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewMatch => "new_match",
            Self::SuperLiked => "super_liked",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::NewMatch => "\u{1F495} New Match!",
            Self::SuperLiked => "\u{2B50} Super Liked!",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Self::NewMatch => "Someone likes you back on REDATE!",
            Self::SuperLiked => "Someone Super Liked you on REDATE!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_match_wording() {
        let t = NotificationTemplate::NewMatch;
        assert_eq!(t.title(), "💕 New Match!");
        assert_eq!(t.body(), "Someone likes you back on REDATE!");
    }

    #[test]
    fn super_liked_wording() {
        let t = NotificationTemplate::SuperLiked;
        assert_eq!(t.title(), "⭐ Super Liked!");
        assert_eq!(t.body(), "Someone Super Liked you on REDATE!");
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(NotificationTemplate::NewMatch.kind(), "new_match");
        assert_eq!(NotificationTemplate::SuperLiked.kind(), "super_liked");
    }
}
