use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// A free-form comment. Authorship is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: CommentPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.updated_at = Utc::now();
    }
}

/// An improvement suggestion for a property the author has stayed at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub id: Uuid,
    pub author_id: Uuid,
    pub property_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Suggestion {
    pub fn new(author_id: Uuid, property_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            property_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: SuggestionPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentPatch {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSuggestion {
    pub property_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionPatch {
    pub content: Option<String>,
}
