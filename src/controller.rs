//! Optimistic mutation controllers.
//!
//! Each controller owns the local state of one affordance (a like button, a comment box, a
//! form). A user trigger moves it `Idle -> Pending` and applies the local change at once;
//! the gateway's answer moves it to `Confirmed` (server values replace the estimate) or
//! `RolledBack` (the local change is reversed and a toast is raised). While `Pending`, further
//! triggers are ignored.
//!
//! State lives behind a `std::sync::Mutex` that is never held across an `.await`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::api::ConfessionsApi;
use crate::cache::{QueryCache, CONFESSIONS_KEY};
use crate::error::{ClientError, ValidationError};
use crate::identity::generate_identity;
use crate::models::*;
use crate::notify::{Notifier, Toast};
use crate::validation::{validate_comment, validate_confession, validate_early_access};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPhase {
    #[default]
    Idle,
    Pending,
    Confirmed,
    RolledBack,
}

/// Result of one user trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Another request for the same affordance was in flight, or the action is spent.
    Ignored,
    /// Rejected locally; nothing was sent.
    Invalid(ValidationError),
    Confirmed(T),
    /// The remote call failed and local state was restored. Carries the surfaced message.
    RolledBack(String),
}

impl<T> Outcome<T> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Outcome::Confirmed(_))
    }
}

/// Collaborators every controller needs.
#[derive(Clone)]
pub struct ControllerContext {
    pub api: ConfessionsApi,
    pub cache: QueryCache,
    pub notifier: Arc<dyn Notifier>,
}

impl ControllerContext {
    pub fn new(api: ConfessionsApi, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, cache, notifier }
    }

    fn invalidate_confessions(&self) {
        self.cache.invalidate(&[CONFESSIONS_KEY]);
    }

    fn surface(&self, err: &ClientError) -> String {
        let msg = err.user_message();
        self.notifier.notify(Toast::error(msg.clone()));
        msg
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------- likes

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LikeState {
    pub has_liked: bool,
    pub is_liking: bool,
    pub likes: i64,
    pub phase: MutationPhase,
}

/// Like button for one confession. One like per controller lifetime unless it rolls back.
pub struct LikeController {
    confession_id: Id,
    ctx: ControllerContext,
    state: Mutex<LikeState>,
    mounted: AtomicBool,
}

impl LikeController {
    pub fn new(confession_id: impl Into<Id>, likes: i64, ctx: ControllerContext) -> Self {
        Self {
            confession_id: confession_id.into(),
            ctx,
            state: Mutex::new(LikeState { likes, ..LikeState::default() }),
            mounted: AtomicBool::new(true),
        }
    }

    pub fn confession_id(&self) -> &str {
        &self.confession_id
    }

    pub fn state(&self) -> LikeState {
        *lock(&self.state)
    }

    /// The owning view went away; outcomes arriving later leave local state alone.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// `Idle -> Pending`. Returns false (and changes nothing) when already liked or in flight.
    pub fn begin(&self) -> bool {
        let mut s = lock(&self.state);
        if s.has_liked || s.is_liking {
            return false;
        }
        s.is_liking = true;
        s.has_liked = true;
        s.likes += 1;
        s.phase = MutationPhase::Pending;
        debug!(id = %self.confession_id, likes = s.likes, "like pending");
        true
    }

    /// `Pending -> Confirmed` with the server's count. No-op unless pending.
    pub fn confirm(&self, likes: i64) -> bool {
        let mut s = lock(&self.state);
        if s.phase != MutationPhase::Pending {
            return false;
        }
        s.likes = likes;
        s.is_liking = false;
        s.phase = MutationPhase::Confirmed;
        true
    }

    /// `Pending -> RolledBack`. Reverses the optimistic increment once; a second call is a no-op.
    pub fn rollback(&self) -> bool {
        let mut s = lock(&self.state);
        if s.phase != MutationPhase::Pending {
            return false;
        }
        s.likes -= 1;
        s.has_liked = false;
        s.is_liking = false;
        s.phase = MutationPhase::RolledBack;
        true
    }

    pub async fn like(&self) -> Outcome<i64> {
        if !self.begin() {
            return Outcome::Ignored;
        }
        match self.ctx.api.like_confession(&self.confession_id).await {
            Ok(likes) => {
                self.ctx.invalidate_confessions();
                if self.is_mounted() {
                    self.confirm(likes);
                }
                Outcome::Confirmed(likes)
            }
            Err(e) => {
                warn!(id = %self.confession_id, "like failed: {e}");
                if !self.is_mounted() {
                    return Outcome::RolledBack(e.user_message());
                }
                self.rollback();
                Outcome::RolledBack(self.ctx.surface(&e))
            }
        }
    }
}

// ---------------------------------------------------------------- comments

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentState {
    pub draft: String,
    pub gender: Gender,
    pub is_pending: bool,
    pub comments: Vec<Comment>,
    pub error: Option<String>,
    pub phase: MutationPhase,
}

/// Comment box under one confession.
///
/// Submitting clears the input and shows the pending indicator right away. The comment itself
/// is appended only once the server returns it with its own id and timestamp.
pub struct CommentComposer {
    confession_id: Id,
    ctx: ControllerContext,
    state: Mutex<CommentState>,
    mounted: AtomicBool,
}

impl CommentComposer {
    pub fn new(confession_id: impl Into<Id>, comments: Vec<Comment>, ctx: ControllerContext) -> Self {
        Self {
            confession_id: confession_id.into(),
            ctx,
            state: Mutex::new(CommentState { comments, ..CommentState::default() }),
            mounted: AtomicBool::new(true),
        }
    }

    pub fn state(&self) -> CommentState {
        lock(&self.state).clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        lock(&self.state).draft = text.into();
    }

    pub fn set_gender(&self, gender: Gender) {
        lock(&self.state).gender = gender;
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub async fn submit(&self) -> Outcome<Comment> {
        let (new, sent_draft) = {
            let mut s = lock(&self.state);
            if s.is_pending {
                return Outcome::Ignored;
            }
            let new = match validate_comment(NewComment { content: s.draft.clone(), gender: s.gender }) {
                Ok(new) => new,
                Err(v) => {
                    s.error = Some(v.to_string());
                    return Outcome::Invalid(v);
                }
            };
            s.is_pending = true;
            s.error = None;
            s.phase = MutationPhase::Pending;
            (new, std::mem::take(&mut s.draft))
        };

        let identity = generate_identity(new.gender);
        let result = self.ctx.api.create_comment(&self.confession_id, &new, identity).await;
        let mounted = self.mounted.load(Ordering::SeqCst);

        match result {
            Ok(comment) => {
                self.ctx.invalidate_confessions();
                if mounted {
                    let mut s = lock(&self.state);
                    s.comments.push(comment.clone());
                    s.gender = Gender::default();
                    s.is_pending = false;
                    s.phase = MutationPhase::Confirmed;
                }
                debug!(id = %comment.id, "comment confirmed");
                Outcome::Confirmed(comment)
            }
            Err(e) => {
                warn!(confession = %self.confession_id, "comment failed: {e}");
                if !mounted {
                    return Outcome::RolledBack(e.user_message());
                }
                let msg = self.ctx.surface(&e);
                let mut s = lock(&self.state);
                // keep anything typed while the request was out
                if s.draft.is_empty() {
                    s.draft = sent_draft;
                }
                s.is_pending = false;
                s.error = Some(msg.clone());
                s.phase = MutationPhase::RolledBack;
                Outcome::RolledBack(msg)
            }
        }
    }
}

// ---------------------------------------------------------------- confessions

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfessionFormState {
    pub content: String,
    pub category: Category,
    pub gender: Gender,
    pub is_pending: bool,
    pub error: Option<String>,
    pub phase: MutationPhase,
}

/// The "share your confession" form.
pub struct ConfessionComposer {
    ctx: ControllerContext,
    state: Mutex<ConfessionFormState>,
}

impl ConfessionComposer {
    pub fn new(ctx: ControllerContext) -> Self {
        Self { ctx, state: Mutex::new(ConfessionFormState::default()) }
    }

    pub fn state(&self) -> ConfessionFormState {
        lock(&self.state).clone()
    }

    pub fn set_content(&self, text: impl Into<String>) {
        lock(&self.state).content = text.into();
    }

    pub fn set_category(&self, category: Category) {
        lock(&self.state).category = category;
    }

    pub fn set_gender(&self, gender: Gender) {
        lock(&self.state).gender = gender;
    }

    pub async fn submit(&self) -> Outcome<Confession> {
        let new = {
            let mut s = lock(&self.state);
            if s.is_pending {
                return Outcome::Ignored;
            }
            s.error = None;
            let draft = NewConfession { content: s.content.clone(), category: s.category, gender: s.gender };
            match validate_confession(draft) {
                Ok(new) => {
                    s.is_pending = true;
                    s.phase = MutationPhase::Pending;
                    new
                }
                Err(v) => {
                    s.error = Some(v.to_string());
                    return Outcome::Invalid(v);
                }
            }
        };

        let identity = generate_identity(new.gender);
        match self.ctx.api.create_confession(&new, identity).await {
            Ok(confession) => {
                {
                    let mut s = lock(&self.state);
                    *s = ConfessionFormState { phase: MutationPhase::Confirmed, ..ConfessionFormState::default() };
                }
                self.ctx.invalidate_confessions();
                info!(id = %confession.id, "confession posted");
                self.ctx.notifier.notify(Toast::success("Confession posted", "Your confession is live."));
                Outcome::Confirmed(confession)
            }
            Err(e) => {
                warn!("confession failed: {e}");
                let msg = e.user_message();
                let mut s = lock(&self.state);
                s.is_pending = false;
                s.error = Some(msg.clone());
                s.phase = MutationPhase::RolledBack;
                Outcome::RolledBack(msg)
            }
        }
    }
}

// ---------------------------------------------------------------- early access

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EarlyAccessState {
    pub name: String,
    pub email: String,
    pub submitted: bool,
    pub is_pending: bool,
    pub error: Option<String>,
    pub phase: MutationPhase,
}

/// Waitlist sign-up.
pub struct EarlyAccessForm {
    ctx: ControllerContext,
    state: Mutex<EarlyAccessState>,
}

impl EarlyAccessForm {
    pub fn new(ctx: ControllerContext) -> Self {
        Self { ctx, state: Mutex::new(EarlyAccessState::default()) }
    }

    pub fn state(&self) -> EarlyAccessState {
        lock(&self.state).clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        lock(&self.state).name = name.into();
    }

    pub fn set_email(&self, email: impl Into<String>) {
        lock(&self.state).email = email.into();
    }

    pub async fn submit(&self) -> Outcome<EarlyAccess> {
        let new = {
            let mut s = lock(&self.state);
            if s.is_pending {
                return Outcome::Ignored;
            }
            match validate_early_access(NewEarlyAccess { email: s.email.clone(), name: s.name.clone() }) {
                Ok(new) => {
                    s.is_pending = true;
                    s.error = None;
                    s.phase = MutationPhase::Pending;
                    new
                }
                Err(v) => {
                    s.error = Some(v.to_string());
                    return Outcome::Invalid(v);
                }
            }
        };

        match self.ctx.api.create_early_access(&new).await {
            Ok(entry) => {
                {
                    let mut s = lock(&self.state);
                    *s = EarlyAccessState { submitted: true, phase: MutationPhase::Confirmed, ..EarlyAccessState::default() };
                }
                self.ctx.notifier.notify(Toast::success("You're on the list!", "Check your email for next steps."));
                Outcome::Confirmed(entry)
            }
            Err(e) => {
                warn!("waitlist sign-up failed: {e}");
                let msg = match &e {
                    ClientError::Api(m) if m.is_empty() => "Failed to join waitlist".to_string(),
                    _ => e.user_message(),
                };
                self.ctx.notifier.notify(Toast::error(msg.clone()));
                let mut s = lock(&self.state);
                s.is_pending = false;
                s.error = Some(msg.clone());
                s.phase = MutationPhase::RolledBack;
                Outcome::RolledBack(msg)
            }
        }
    }
}
