pub mod service;
pub mod template;

pub use service::{HttpMailNotifier, MailError};
pub use template::{confirmation_email, ConfirmationDetails};
