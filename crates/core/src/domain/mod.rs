mod channel;
mod clock;
mod error;
mod ids;
mod message;
mod session;

pub use channel::{CONNECT, Channel, DISCONNECT, HANDSHAKE, SUBSCRIBE, UNSUBSCRIBE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SessionError;
pub use ids::ClientId;
pub use message::{
    Batch, Connect, Disconnect, Handshake, Message, OtherMessage, SubscriptionChange,
};
pub use session::{ClientSession, ConnectTally, ExpiryPolicy, ReconnectPolicy, SessionStore};
