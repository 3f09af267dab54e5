pub mod dto;
pub mod error;
pub mod model;
pub mod service;

pub use dto::{
    AckResponse, CommitRequest, CreateSessionRequest, CreateSessionResponse,
    HydrateSessionResponse, LineUpdate, SessionView,
};
pub use error::ShareServiceError;
pub use model::{CachedSessionLine, SessionStatus, ShareSession};
pub use service::{ShareService, ShareServiceApi};
