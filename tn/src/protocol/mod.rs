//! Coordinator <-> worker message protocol
//!
//! A closed set of message variants ([`Message`]) and the JSON frame codec
//! used to move them across channels ([`encode`] / [`decode`]).

mod codec;
mod messages;

pub use codec::{DISCRIMINANT_KEY, ProtocolError, decode, encode, from_value};
pub use messages::{Message, MessageKind};
