//! MAL wire enumerations: interaction types, session kinds, QoS levels,
//! and the standard error numbers.

use std::fmt;

/// The six MAL interaction patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum InteractionType {
    /// Fire-and-forget
    Send = 0x01,
    /// Acknowledged submit
    Submit = 0x02,
    /// Single request, single response
    Request = 0x03,
    /// Acknowledged request with deferred response
    Invoke = 0x04,
    /// Acknowledged request with streamed updates and a final response
    Progress = 0x05,
    /// Publish/subscribe through a broker
    PubSub = 0x06,
}

impl InteractionType {
    /// Convert from byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Send),
            0x02 => Some(Self::Submit),
            0x03 => Some(Self::Request),
            0x04 => Some(Self::Invoke),
            0x05 => Some(Self::Progress),
            0x06 => Some(Self::PubSub),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Wire name, as carried in out-of-band header fields
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Send => "SEND",
            Self::Submit => "SUBMIT",
            Self::Request => "REQUEST",
            Self::Invoke => "INVOKE",
            Self::Progress => "PROGRESS",
            Self::PubSub => "PUBSUB",
        }
    }

    /// Resolve a wire name back to the interaction type
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SEND" => Some(Self::Send),
            "SUBMIT" => Some(Self::Submit),
            "REQUEST" => Some(Self::Request),
            "INVOKE" => Some(Self::Invoke),
            "PROGRESS" => Some(Self::Progress),
            "PUBSUB" => Some(Self::PubSub),
            _ => None,
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Session kind carried by the message header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SessionType {
    /// Live operations session
    #[default]
    Live = 0x01,
    /// Simulated session
    Simulation = 0x02,
    /// Replay of recorded data
    Replay = 0x03,
}

impl SessionType {
    /// Convert from byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Live),
            0x02 => Some(Self::Simulation),
            0x03 => Some(Self::Replay),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Wire name, as carried in out-of-band header fields
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::Simulation => "SIMULATION",
            Self::Replay => "REPLAY",
        }
    }

    /// Resolve a wire name back to the session type
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LIVE" => Some(Self::Live),
            "SIMULATION" => Some(Self::Simulation),
            "REPLAY" => Some(Self::Replay),
            _ => None,
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Delivery quality-of-service level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum QosLevel {
    /// No delivery guarantee
    #[default]
    BestEffort = 0x01,
    /// Guaranteed delivery
    Assured = 0x02,
    /// Delivery deferred until the destination is reachable
    Queued = 0x03,
    /// Delivery only while the data is current
    Timely = 0x04,
}

impl QosLevel {
    /// Convert from byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::BestEffort),
            0x02 => Some(Self::Assured),
            0x03 => Some(Self::Queued),
            0x04 => Some(Self::Timely),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Wire name, as carried in out-of-band header fields
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BestEffort => "BESTEFFORT",
            Self::Assured => "ASSURED",
            Self::Queued => "QUEUED",
            Self::Timely => "TIMELY",
        }
    }

    /// Resolve a wire name back to the QoS level
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "BESTEFFORT" => Some(Self::BestEffort),
            "ASSURED" => Some(Self::Assured),
            "QUEUED" => Some(Self::Queued),
            "TIMELY" => Some(Self::Timely),
            _ => None,
        }
    }
}

impl fmt::Display for QosLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// MAL standard error numbers
///
/// These are the codes a peer places in the first body element of an error
/// message. Service areas define further codes above this range, so error
/// bodies and [`crate::Error::Remote`] carry a raw `u32` and this enum only
/// names the standard set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum ErrorCode {
    /// Confirmed communication error
    DeliveryFailed = 65536,
    /// Unconfirmed communication error
    DeliveryTimedout = 65537,
    /// Message queued somewhere awaiting contact
    DeliveryDelayed = 65538,
    /// Destination cannot be contacted
    DestinationUnknown = 65539,
    /// Destination middleware reports the destination application is down
    DestinationTransient = 65540,
    /// Destination lost halfway through the conversation
    DestinationLost = 65541,
    /// Failure to authenticate the message
    AuthenticationFail = 65542,
    /// Failure in the encryption of the message
    EncryptionFail = 65543,
    /// Area not supported by the destination
    UnsupportedArea = 65544,
    /// Area version not supported by the destination
    UnsupportedAreaVersion = 65545,
    /// Service not supported by the destination
    UnsupportedService = 65546,
    /// Operation not supported by the destination
    UnsupportedOperation = 65547,
    /// Encoding of the message body was erroneous
    BadEncoding = 65548,
    /// Internal error in the peer
    Internal = 65549,
    /// Operation specific error
    Unknown = 65550,
    /// Operation attempted in a wrong state
    IncorrectState = 65551,
    /// Resource limit reached at the peer
    TooMany = 65552,
    /// Peer is shutting down
    Shutdown = 65553,
}

impl ErrorCode {
    /// Convert from the wire number
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            65536 => Some(Self::DeliveryFailed),
            65537 => Some(Self::DeliveryTimedout),
            65538 => Some(Self::DeliveryDelayed),
            65539 => Some(Self::DestinationUnknown),
            65540 => Some(Self::DestinationTransient),
            65541 => Some(Self::DestinationLost),
            65542 => Some(Self::AuthenticationFail),
            65543 => Some(Self::EncryptionFail),
            65544 => Some(Self::UnsupportedArea),
            65545 => Some(Self::UnsupportedAreaVersion),
            65546 => Some(Self::UnsupportedService),
            65547 => Some(Self::UnsupportedOperation),
            65548 => Some(Self::BadEncoding),
            65549 => Some(Self::Internal),
            65550 => Some(Self::Unknown),
            65551 => Some(Self::IncorrectState),
            65552 => Some(Self::TooMany),
            65553 => Some(Self::Shutdown),
            _ => None,
        }
    }

    /// Convert to the wire number
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DeliveryFailed => "DELIVERY_FAILED",
            Self::DeliveryTimedout => "DELIVERY_TIMEDOUT",
            Self::DeliveryDelayed => "DELIVERY_DELAYED",
            Self::DestinationUnknown => "DESTINATION_UNKNOWN",
            Self::DestinationTransient => "DESTINATION_TRANSIENT",
            Self::DestinationLost => "DESTINATION_LOST",
            Self::AuthenticationFail => "AUTHENTICATION_FAIL",
            Self::EncryptionFail => "ENCRYPTION_FAIL",
            Self::UnsupportedArea => "UNSUPPORTED_AREA",
            Self::UnsupportedAreaVersion => "UNSUPPORTED_AREA_VERSION",
            Self::UnsupportedService => "UNSUPPORTED_SERVICE",
            Self::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            Self::BadEncoding => "BAD_ENCODING",
            Self::Internal => "INTERNAL",
            Self::Unknown => "UNKNOWN",
            Self::IncorrectState => "INCORRECT_STATE",
            Self::TooMany => "TOO_MANY",
            Self::Shutdown => "SHUTDOWN",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_type_roundtrip() {
        for it in [
            InteractionType::Send,
            InteractionType::Submit,
            InteractionType::Request,
            InteractionType::Invoke,
            InteractionType::Progress,
            InteractionType::PubSub,
        ] {
            assert_eq!(InteractionType::from_u8(it.as_u8()), Some(it));
            assert_eq!(InteractionType::from_name(it.name()), Some(it));
        }
        assert_eq!(InteractionType::from_u8(0x07), None);
        assert_eq!(InteractionType::from_name("BROADCAST"), None);
    }

    #[test]
    fn test_error_code_roundtrip() {
        assert_eq!(ErrorCode::from_u32(65544), Some(ErrorCode::UnsupportedArea));
        assert_eq!(ErrorCode::UnsupportedArea.as_u32(), 65544);
        assert_eq!(ErrorCode::from_u32(12), None);
    }

    #[test]
    fn test_qos_and_session_names() {
        assert_eq!(QosLevel::from_name("TIMELY"), Some(QosLevel::Timely));
        assert_eq!(SessionType::from_name("REPLAY"), Some(SessionType::Replay));
        assert_eq!(SessionType::Live.to_string(), "LIVE");
    }
}
