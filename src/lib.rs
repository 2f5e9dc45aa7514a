/// Payload codecs (JSON, MessagePack).
pub mod codec;
/// Settings loading from defaults and `LOCALBUS_*` environment variables.
pub mod config;
/// Error types: broker, codec, logging.
pub mod error;
/// Logging setup (formats, filters).
pub mod logging;
/// Pub/Sub: Broker, topic tree, subscriptions, queue groups.
pub mod pubsub;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Codecs.
pub use codec::{Codec, JsonCodec, MsgPackCodec};
/// Settings.
pub use self::config::Settings;
/// Operation errors and result types.
pub use error::{BrokerError, BrokerResult, CodecError, LoggingError};
/// Logging.
pub use logging::{init_logging, LogFormat, LoggingConfig};
/// Pub/Sub API.
pub use pubsub::{
    Broker, BrokerBuilder, BrokerStats, Handler, IndexSource, Message, SeededSource,
    Subscription, ThreadRngSource, TypedBus,
};
