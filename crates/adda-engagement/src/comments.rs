//! Comment thread - optimistic comment list for one entity

use std::sync::atomic::{AtomicBool, Ordering};

use adda_core::{
    Comment, CommentAuthor, CommentDraft, CommentId, DomainError, DomainResult, EntityRef,
    NotifyLevel, RewardEvent,
};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::context::EngagementContext;

#[derive(Debug, Default)]
struct ThreadState {
    comments: Vec<Comment>,
    input: String,
}

/// Comments under one entity with an input buffer.
///
/// A submitted comment shows up immediately under a temporary id and is
/// replaced by the server's list once accepted, or removed if rejected.
pub struct CommentThread {
    ctx: EngagementContext,
    entity: EntityRef,
    state: Mutex<ThreadState>,
    mounted: AtomicBool,
}

impl CommentThread {
    /// Create an empty thread; call [`load`](Self::load) to fetch comments
    pub fn new(ctx: &EngagementContext, entity: EntityRef) -> Self {
        Self {
            ctx: ctx.clone(),
            entity,
            state: Mutex::new(ThreadState::default()),
            mounted: AtomicBool::new(true),
        }
    }

    /// Fetch the authoritative comment list
    #[instrument(skip(self), fields(entity = %self.entity))]
    pub async fn load(&self) -> DomainResult<Vec<Comment>> {
        let comments = self.ctx.api().list_comments(&self.entity).await?;
        debug!(count = comments.len(), "Comments loaded");
        if self.is_mounted() {
            self.state.lock().comments.clone_from(&comments);
        }
        Ok(comments)
    }

    pub fn set_input(&self, input: impl Into<String>) {
        self.state.lock().input = input.into();
    }

    pub fn input(&self) -> String {
        self.state.lock().input.clone()
    }

    /// Current list, pending drafts included
    pub fn comments(&self) -> Vec<Comment> {
        self.state.lock().comments.clone()
    }

    /// Submit whatever is in the input buffer
    pub async fn submit_input(&self) -> DomainResult<Comment> {
        let body = self.input();
        self.submit(&body).await
    }

    /// Post a comment.
    ///
    /// Invalid bodies are rejected before anything changes. Otherwise a
    /// pending draft is appended and the input cleared; on failure the draft
    /// is removed again and the error returned.
    #[instrument(skip(self, body), fields(entity = %self.entity))]
    pub async fn submit(&self, body: &str) -> DomainResult<Comment> {
        let draft = CommentDraft::new(body)?;

        if !self.ctx.is_signed_in() {
            self.ctx.identity().prompt_sign_in();
            return Err(DomainError::AuthRequired);
        }

        let author = self
            .ctx
            .identity()
            .current_user()
            .unwrap_or_else(CommentAuthor::anonymous);
        let pending = draft.into_pending(author);
        let temp_id = pending.id.clone();
        let body = pending.body.clone();

        {
            let mut state = self.state.lock();
            state.comments.push(pending);
            state.input.clear();
        }
        debug!(draft = %temp_id, "Draft comment appended");

        match self.ctx.api().add_comment(&self.entity, &body).await {
            Ok(created) => {
                let refreshed = self.ctx.api().list_comments(&self.entity).await;
                if self.is_mounted() {
                    self.reconcile(&temp_id, &created, refreshed);
                }
                info!(comment = %created.id, "Comment posted");
                self.ctx.spawn_reward(RewardEvent::Comment, &self.entity);
                Ok(created)
            }
            Err(e) => {
                if self.is_mounted() {
                    self.state.lock().comments.retain(|c| c.id != temp_id);
                }
                warn!(error = %e, draft = %temp_id, "Comment rejected, draft removed");
                if e.is_auth() {
                    self.ctx.identity().prompt_sign_in();
                }
                self.ctx.notifier().notify(NotifyLevel::Error, &e.user_message());
                Err(e)
            }
        }
    }

    fn reconcile(&self, temp_id: &CommentId, created: &Comment, refreshed: DomainResult<Vec<Comment>>) {
        let mut state = self.state.lock();
        match refreshed {
            Ok(list) => state.comments = list,
            Err(e) => {
                warn!(error = %e, "Comment re-fetch failed, keeping server copy");
                if let Some(slot) = state.comments.iter_mut().find(|c| &c.id == temp_id) {
                    *slot = created.clone();
                }
            }
        }
    }

    /// Check if the thread is still mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Ignore completions that arrive from now on; idempotent
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for CommentThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentThread")
            .field("entity", &self.entity)
            .field("comments", &self.state.lock().comments.len())
            .finish_non_exhaustive()
    }
}
