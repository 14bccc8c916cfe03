pub mod conversation;
pub mod event;
pub mod message;
pub mod types;

pub use conversation::assemble;
pub use event::{ChatEvent, ChatEventKind};
pub use message::{Attachment, InvalidDraft, Message, MessageDraft};
pub use types::{MessageId, Username};
