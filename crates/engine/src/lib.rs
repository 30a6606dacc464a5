pub mod adapters;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod outcome;
pub mod registry;
pub mod validators;

pub use adapters::{Adapter, AdapterChain};
pub use config::MockConfig;
pub use context::{Payload, RequestContext};
pub use dispatcher::Dispatcher;
pub use error::{EngineError, ProtocolError, Rejection, Result};
pub use outcome::{Body, Outcome};
pub use validators::{Validator, ValidatorChain};
