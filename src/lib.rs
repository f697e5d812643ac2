pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod gateway;
pub mod identity;
pub mod models;
pub mod notify;
pub mod validation;

// Re-export commonly used items for the binary / external users
pub use api::ConfessionsApi;
pub use cache::{ConfessionFeed, QueryCache, QueryKey};
pub use controller::{
    CommentComposer, ConfessionComposer, ControllerContext, EarlyAccessForm, LikeController, MutationPhase, Outcome,
};
pub use error::{ClientError, ClientResult, ValidationError};
pub use gateway::{Gateway, GraphqlClient};
pub use identity::{generate_avatar_url, generate_identity, generate_name, generate_seed, AnonymousIdentity, Seed};
