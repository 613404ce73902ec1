//! MAL message header
//!
//! A plain record created once per transaction by the initiating side and
//! derived (copy, swap addressing, overwrite stage and error flag) by the
//! responding side. Header fields are metadata and travel outside the body
//! codec; [`MessageHeader::field_pairs`] and
//! [`MessageHeader::from_field_pairs`] give transports the standard
//! `X-MAL-*` out-of-band representation.

use crate::types::Time;

use super::error::{Error, Result};
use super::types::{InteractionType, QosLevel, SessionType};

/// Out-of-band field names, in the order `field_pairs` emits them
pub const HEADER_FIELDS: [&str; 19] = [
    "X-MAL-From",
    "X-MAL-To",
    "X-MAL-Authentication-Id",
    "X-MAL-Timestamp",
    "X-MAL-Interaction-Type",
    "X-MAL-Interaction-Stage",
    "X-MAL-Transaction-Id",
    "X-MAL-Service-Area",
    "X-MAL-Service",
    "X-MAL-Operation",
    "X-MAL-Area-Version",
    "X-MAL-Is-Error-Message",
    "X-MAL-Session",
    "X-MAL-Session-Name",
    "X-MAL-Priority",
    "X-MAL-Domain",
    "X-MAL-Network-Zone",
    "X-MAL-QoSlevel",
    "X-MAL-Supplements",
];

/// MAL message header
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageHeader {
    /// Identity of the originator
    pub from: String,
    /// Identity of the destination
    pub to: String,
    /// Authentication token, hex on the wire
    pub authentication_id: Vec<u8>,
    /// Creation time of the message
    pub timestamp: Time,
    /// Interaction pattern this message belongs to
    pub interaction_type: InteractionType,
    /// Stage within the pattern
    pub interaction_stage: u8,
    /// Transaction this message belongs to
    pub transaction_id: u64,
    /// Service area number
    pub service_area: u16,
    /// Service number within the area
    pub service: u16,
    /// Operation number within the service
    pub operation: u16,
    /// Version of the area definitions
    pub area_version: u8,
    /// Whether the body carries an error number instead of a payload
    pub is_error_message: bool,
    /// Session kind
    pub session: SessionType,
    /// Session name
    pub session_name: String,
    /// Delivery priority
    pub priority: u32,
    /// Domain segments, dot-joined on the wire
    pub domain: Vec<String>,
    /// Network zone
    pub network_zone: String,
    /// Delivery quality of service
    pub qos_level: QosLevel,
    /// Free-form key=value supplements
    pub supplements: Vec<(String, String)>,
}

impl MessageHeader {
    /// Derive the response header for this message
    ///
    /// Copies everything, swaps addressing, and overwrites the stage and
    /// error flag.
    #[must_use]
    pub fn reply(&self, stage: u8, is_error: bool) -> Self {
        let mut header = self.clone();
        header.from = self.to.clone();
        header.to = self.from.clone();
        header.interaction_stage = stage;
        header.is_error_message = is_error;
        header
    }

    /// Out-of-band field representation, one `(name, value)` pair per field
    #[must_use]
    pub fn field_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("X-MAL-From", self.from.clone()),
            ("X-MAL-To", self.to.clone()),
            ("X-MAL-Authentication-Id", hex::encode(&self.authentication_id)),
            ("X-MAL-Timestamp", self.timestamp.format()),
            ("X-MAL-Interaction-Type", self.interaction_type.name().to_string()),
            ("X-MAL-Interaction-Stage", self.interaction_stage.to_string()),
            ("X-MAL-Transaction-Id", self.transaction_id.to_string()),
            ("X-MAL-Service-Area", self.service_area.to_string()),
            ("X-MAL-Service", self.service.to_string()),
            ("X-MAL-Operation", self.operation.to_string()),
            ("X-MAL-Area-Version", self.area_version.to_string()),
            (
                "X-MAL-Is-Error-Message",
                String::from(if self.is_error_message { "True" } else { "False" }),
            ),
            ("X-MAL-Session", self.session.name().to_string()),
            ("X-MAL-Session-Name", self.session_name.clone()),
            ("X-MAL-Priority", self.priority.to_string()),
            ("X-MAL-Domain", self.domain.join(".")),
            ("X-MAL-Network-Zone", self.network_zone.clone()),
            ("X-MAL-QoSlevel", self.qos_level.name().to_string()),
            (
                "X-MAL-Supplements",
                self.supplements
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(";"),
            ),
        ]
    }

    /// Rebuild a header from its out-of-band field representation
    pub fn from_field_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut fields: Vec<(&str, &str)> = pairs.into_iter().collect();

        let mut take = |name: &'static str| -> Result<&'a str> {
            let index = fields
                .iter()
                .position(|(k, _)| *k == name)
                .ok_or_else(|| Error::MissingHeaderField {
                    name: name.to_string(),
                })?;
            Ok(fields.swap_remove(index).1)
        };

        let malformed = |name: &'static str, value: &str| Error::MalformedHeaderField {
            name: name.to_string(),
            value: value.to_string(),
        };

        let from = take("X-MAL-From")?.to_string();
        let to = take("X-MAL-To")?.to_string();
        let auth = take("X-MAL-Authentication-Id")?;
        let authentication_id =
            hex::decode(auth).map_err(|_| malformed("X-MAL-Authentication-Id", auth))?;
        let timestamp = Time::parse(take("X-MAL-Timestamp")?)?;
        let it = take("X-MAL-Interaction-Type")?;
        let interaction_type = InteractionType::from_name(it)
            .ok_or_else(|| malformed("X-MAL-Interaction-Type", it))?;
        let stage = take("X-MAL-Interaction-Stage")?;
        let interaction_stage = stage
            .parse()
            .map_err(|_| malformed("X-MAL-Interaction-Stage", stage))?;
        let txn = take("X-MAL-Transaction-Id")?;
        let transaction_id = txn.parse().map_err(|_| malformed("X-MAL-Transaction-Id", txn))?;
        let area = take("X-MAL-Service-Area")?;
        let service_area = area.parse().map_err(|_| malformed("X-MAL-Service-Area", area))?;
        let service_text = take("X-MAL-Service")?;
        let service = service_text
            .parse()
            .map_err(|_| malformed("X-MAL-Service", service_text))?;
        let op = take("X-MAL-Operation")?;
        let operation = op.parse().map_err(|_| malformed("X-MAL-Operation", op))?;
        let ver = take("X-MAL-Area-Version")?;
        let area_version = ver.parse().map_err(|_| malformed("X-MAL-Area-Version", ver))?;
        let err_flag = take("X-MAL-Is-Error-Message")?;
        let is_error_message = match err_flag {
            "True" => true,
            "False" => false,
            other => return Err(malformed("X-MAL-Is-Error-Message", other)),
        };
        let session_text = take("X-MAL-Session")?;
        let session = SessionType::from_name(session_text)
            .ok_or_else(|| malformed("X-MAL-Session", session_text))?;
        let session_name = take("X-MAL-Session-Name")?.to_string();
        let prio = take("X-MAL-Priority")?;
        let priority = prio.parse().map_err(|_| malformed("X-MAL-Priority", prio))?;
        let domain_text = take("X-MAL-Domain")?;
        let domain = if domain_text.is_empty() {
            Vec::new()
        } else {
            domain_text.split('.').map(str::to_string).collect()
        };
        let network_zone = take("X-MAL-Network-Zone")?.to_string();
        let qos_text = take("X-MAL-QoSlevel")?;
        let qos_level =
            QosLevel::from_name(qos_text).ok_or_else(|| malformed("X-MAL-QoSlevel", qos_text))?;
        // Supplements are optional on the wire.
        let supplements = match take("X-MAL-Supplements") {
            Ok("") | Err(_) => Vec::new(),
            Ok(text) => text
                .split(';')
                .filter_map(|entry| {
                    entry
                        .split_once('=')
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                })
                .collect(),
        };

        Ok(Self {
            from,
            to,
            authentication_id,
            timestamp,
            interaction_type,
            interaction_stage,
            transaction_id,
            service_area,
            service,
            operation,
            area_version,
            is_error_message,
            session,
            session_name,
            priority,
            domain,
            network_zone,
            qos_level,
            supplements,
        })
    }
}
