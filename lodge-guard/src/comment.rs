use std::sync::Arc;

use lodge_core::repository::CommentRepository;
use lodge_core::{AccessPolicy, Action, Actor, CoreResult, Resource, ResourceKind, VisibilityScope};
use lodge_shared::{Comment, CommentPatch, NewComment};
use tracing::info;
use uuid::Uuid;

use crate::{found, required_text};

#[derive(Clone)]
pub struct CommentGuard {
    comments: Arc<dyn CommentRepository>,
}

impl CommentGuard {
    pub fn new(comments: Arc<dyn CommentRepository>) -> Self {
        Self { comments }
    }

    pub async fn create(&self, actor: &Actor, new: NewComment) -> CoreResult<Comment> {
        AccessPolicy::authorize(actor, Action::Create, &Resource::owned_by(ResourceKind::Comment, actor.id))?;

        let comment = Comment::new(actor.id, required_text("content", &new.content)?);
        self.comments.insert_comment(&comment).await?;

        info!("Comment {} posted by {} {}", comment.id, actor.role, actor.id);
        Ok(comment)
    }

    pub async fn read(&self, id: Uuid, actor: &Actor) -> CoreResult<Comment> {
        let comment = self.load(id).await?;
        AccessPolicy::authorize(actor, Action::Read, &Resource::comment(&comment))?;
        Ok(comment)
    }

    pub async fn update(&self, id: Uuid, patch: CommentPatch, actor: &Actor) -> CoreResult<Comment> {
        let mut comment = self.load(id).await?;
        AccessPolicy::authorize(actor, Action::Update, &Resource::comment(&comment))?;

        let content = patch.content.map(|c| required_text("content", &c)).transpose()?;
        comment.apply(CommentPatch { content });
        self.comments.update_comment(&comment).await?;
        self.read(id, actor).await
    }

    pub async fn delete(&self, id: Uuid, actor: &Actor) -> CoreResult<()> {
        let comment = self.load(id).await?;
        AccessPolicy::authorize(actor, Action::Delete, &Resource::comment(&comment))?;

        self.comments.delete_comment(id).await?;
        info!("Comment {} deleted by {} {}", id, actor.role, actor.id);
        Ok(())
    }

    pub async fn list(&self, actor: &Actor) -> CoreResult<Vec<Comment>> {
        let author = match AccessPolicy::scope(actor, ResourceKind::Comment) {
            VisibilityScope::All => None,
            VisibilityScope::Author(id) | VisibilityScope::Guest(id) | VisibilityScope::PropertyOwner(id) => Some(id),
        };
        Ok(self.comments.list_comments(author).await?)
    }

    async fn load(&self, id: Uuid) -> CoreResult<Comment> {
        found(self.comments.get_comment(id).await?, ResourceKind::Comment, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::World;
    use lodge_core::CoreError;

    fn text(content: &str) -> NewComment {
        NewComment { content: content.to_string() }
    }

    #[tokio::test]
    async fn test_author_and_admin_manage_comment() {
        let w = World::new().await;
        let comment = w.comments.create(&w.guest, text("  Lovely terrace  ")).await.unwrap();
        assert_eq!(comment.content, "Lovely terrace");
        assert_eq!(comment.author_id, w.guest.id);

        let patch = CommentPatch { content: Some("Lovely terrace, noisy street".to_string()) };
        let edited = w.comments.update(comment.id, patch, &w.guest).await.unwrap();
        assert_eq!(edited.content, "Lovely terrace, noisy street");

        assert!(w.comments.read(comment.id, &w.admin).await.is_ok());
        w.comments.delete(comment.id, &w.admin).await.unwrap();
        let err = w.comments.read(comment.id, &w.guest).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_suppliers_have_no_rights_over_comments() {
        let w = World::new().await;
        let comment = w.comments.create(&w.guest, text("Check-in was smooth")).await.unwrap();

        for actor in [w.supplier, w.other_guest] {
            let err = w.comments.read(comment.id, &actor).await.unwrap_err();
            assert!(matches!(err, CoreError::Forbidden(_)));
            let patch = CommentPatch { content: Some("edited".to_string()) };
            let err = w.comments.update(comment.id, patch, &actor).await.unwrap_err();
            assert!(matches!(err, CoreError::Forbidden(_)));
            let err = w.comments.delete(comment.id, &actor).await.unwrap_err();
            assert!(matches!(err, CoreError::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn test_empty_content_is_invalid() {
        let w = World::new().await;
        let err = w.comments.create(&w.guest, text("   ")).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_list_shows_own_comments_unless_admin() {
        let w = World::new().await;
        w.comments.create(&w.guest, text("first")).await.unwrap();
        w.comments.create(&w.other_guest, text("second")).await.unwrap();
        w.comments.create(&w.supplier, text("third")).await.unwrap();

        let own = w.comments.list(&w.guest).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].author_id, w.guest.id);

        assert_eq!(w.comments.list(&w.supplier).await.unwrap().len(), 1);
        assert_eq!(w.comments.list(&w.admin).await.unwrap().len(), 3);
    }
}
