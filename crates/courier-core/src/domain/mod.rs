//! Domain model (ids, topics, connection headers, inbound messages, errors).

pub mod errors;
pub mod header;
pub mod ids;
pub mod inbound;
pub mod topic;

pub use self::errors::{CourierError, DeserializationError};
pub use self::header::{ConnectionHeader, SharedHeader, shared_header};
pub use self::ids::MessageId;
pub use self::inbound::InboundMessage;
pub use self::topic::Topic;
