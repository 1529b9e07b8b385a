// External collaborators: MongoDB credential store, SendGrid notifier

pub mod mongo;
pub mod sendgrid;

pub use mongo::MongoMemberStore;
pub use sendgrid::SendGridClient;
