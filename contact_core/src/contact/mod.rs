//! Contact form relay: submission decoding, message composition and delivery

pub mod message;
pub mod relay;
pub mod submission;
pub mod transport;

pub use message::{render_html, OutboundMessage, SENDER_DISPLAY_NAME};
pub use relay::ContactRelay;
pub use submission::{Submission, SubmissionFields};
pub use transport::{DeliveryAck, MailTransport, SmtpMailTransport, TransportError};
