//! Interaction stage numbering
//!
//! Stages are numbered per pattern; a `(InteractionType, stage)` pair fully
//! identifies a step. An error stage carries the number of the stage it
//! stands in for, with the header error flag raised.

/// Only stage of the Send pattern
pub const SEND: u8 = 1;

/// Initial stage of the Submit pattern
pub const SUBMIT: u8 = 1;
/// Acknowledgement stage of the Submit pattern
pub const SUBMIT_ACK: u8 = 2;
/// Error stage of the Submit pattern
pub const SUBMIT_ERROR: u8 = 2;

/// Initial stage of the Request pattern
pub const REQUEST: u8 = 1;
/// Response stage of the Request pattern
pub const REQUEST_RESPONSE: u8 = 2;
/// Error stage of the Request pattern
pub const REQUEST_ERROR: u8 = 2;

/// Initial stage of the Invoke pattern
pub const INVOKE: u8 = 1;
/// Acknowledgement stage of the Invoke pattern
pub const INVOKE_ACK: u8 = 2;
/// Error stage standing in for the Invoke acknowledgement
pub const INVOKE_ACK_ERROR: u8 = 2;
/// Response stage of the Invoke pattern
pub const INVOKE_RESPONSE: u8 = 3;
/// Error stage standing in for the Invoke response
pub const INVOKE_RESPONSE_ERROR: u8 = 3;

/// Initial stage of the Progress pattern
pub const PROGRESS: u8 = 1;
/// Acknowledgement stage of the Progress pattern
pub const PROGRESS_ACK: u8 = 2;
/// Error stage standing in for the Progress acknowledgement
pub const PROGRESS_ACK_ERROR: u8 = 2;
/// Update stage of the Progress pattern (repeatable)
pub const PROGRESS_UPDATE: u8 = 3;
/// Error stage standing in for a Progress update
pub const PROGRESS_UPDATE_ERROR: u8 = 3;
/// Final response stage of the Progress pattern
pub const PROGRESS_RESPONSE: u8 = 4;
/// Error stage standing in for the Progress response
pub const PROGRESS_RESPONSE_ERROR: u8 = 4;

/// Subscriber registration stage of the PubSub pattern
pub const PUBSUB_REGISTER: u8 = 1;
/// Broker acknowledgement of a subscriber registration
pub const PUBSUB_REGISTER_ACK: u8 = 2;
/// Error stage standing in for the registration acknowledgement
pub const PUBSUB_REGISTER_ERROR: u8 = 2;
/// Publisher registration stage of the PubSub pattern
pub const PUBSUB_PUBLISH_REGISTER: u8 = 3;
/// Broker acknowledgement of a publisher registration
pub const PUBSUB_PUBLISH_REGISTER_ACK: u8 = 4;
/// Error stage standing in for the publisher-registration acknowledgement
pub const PUBSUB_PUBLISH_REGISTER_ERROR: u8 = 4;
/// Publication stage, publisher to broker
pub const PUBSUB_PUBLISH: u8 = 5;
/// Error stage reported back to a publisher for a failed publication
pub const PUBSUB_PUBLISH_ERROR: u8 = 5;
/// Notification stage, broker to subscriber (repeatable)
pub const PUBSUB_NOTIFY: u8 = 6;
/// Error stage standing in for a notification
pub const PUBSUB_NOTIFY_ERROR: u8 = 6;
/// Subscriber deregistration stage of the PubSub pattern
pub const PUBSUB_DEREGISTER: u8 = 7;
/// Broker acknowledgement of a subscriber deregistration
pub const PUBSUB_DEREGISTER_ACK: u8 = 8;
/// Error stage standing in for the deregistration acknowledgement
pub const PUBSUB_DEREGISTER_ERROR: u8 = 8;
/// Publisher deregistration stage of the PubSub pattern
pub const PUBSUB_PUBLISH_DEREGISTER: u8 = 9;
/// Broker acknowledgement of a publisher deregistration
pub const PUBSUB_PUBLISH_DEREGISTER_ACK: u8 = 10;
/// Error stage standing in for the publisher-deregistration acknowledgement
pub const PUBSUB_PUBLISH_DEREGISTER_ERROR: u8 = 10;
