/// Local input problems caught before anything is sent to the backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please write your confession")]
    EmptyConfession,
    #[error("Confession is too long. Maximum {max} characters.")]
    ConfessionTooLong { max: usize },
    #[error("Please write a comment")]
    EmptyComment,
    #[error("Please enter your name")]
    EmptyName,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("GraphQL request failed: {} {body}", status_label(.status))]
    Transport { status: Option<u16>, body: String },
    #[error("{0}")]
    Api(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("cache encode failed: {0}")]
    Cache(#[source] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

fn status_label(status: &Option<u16>) -> String {
    status.map(|s| s.to_string()).unwrap_or_else(|| "network".into())
}

impl ClientError {
    /// Text shown to the user in a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport { .. } => "Something went wrong. Please try again.".to_string(),
            ClientError::Api(msg) if !msg.is_empty() => msg.clone(),
            ClientError::Api(_) => "Something went wrong. Please try again.".to_string(),
            ClientError::Validation(v) => v.to_string(),
            ClientError::Configuration(msg) => format!("Service unavailable: {msg}"),
            ClientError::Cache(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}
