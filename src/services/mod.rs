pub mod auth_service;
pub mod learning_service;
pub mod upload_service;

pub use auth_service::{AccountError, AuthService, LoginRequest, LoginResponse, RegisterRequest};
pub use learning_service::{LearningError, LearningPage, LearningService, PageParams};
pub use upload_service::{UploadError, UploadService};
