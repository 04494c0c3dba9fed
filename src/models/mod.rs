pub mod account;
pub mod activity;
pub mod file_ref;
pub mod notification;
pub mod submission;

pub use account::Account;
pub use activity::Activity;
pub use file_ref::FileRef;
pub use notification::Notification;
pub use submission::{LearnerSubmissionRow, ReviewStatus, Submission, SubmissionDetailRow};
