pub mod account;
pub mod learning;

pub use account::{Account, AccountProfile, NewAccount};
pub use learning::{Attachment, Learning, LearningDraft, LearningRow};
