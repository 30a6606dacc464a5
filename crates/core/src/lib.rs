pub mod domain;

pub use domain::{
    Batch, CONNECT, Channel, ClientId, ClientSession, Clock, Connect, ConnectTally, DISCONNECT,
    Disconnect, ExpiryPolicy, HANDSHAKE, Handshake, ManualClock, Message, OtherMessage,
    ReconnectPolicy, SUBSCRIBE, SessionError, SessionStore, SubscriptionChange, SystemClock,
    UNSUBSCRIBE,
};
