use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

pub(crate) const NOT_AVAILABLE: &str = "N/A";

/// Kind of a repeated per-interface field.
///
/// The declaration order is the order in which kinds are numbered and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKind {
    IpAddress,
    Description,
    Dot1qVlan,
}

impl FieldKind {
    #[cfg(test)]
    pub(crate) const ALL: [FieldKind; 3] = [
        FieldKind::IpAddress,
        FieldKind::Description,
        FieldKind::Dot1qVlan,
    ];

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            FieldKind::IpAddress => "ip_address",
            FieldKind::Description => "description",
            FieldKind::Dot1qVlan => "dot1q_vlan",
        }
    }
}

/// A kind plus its device-wide ordinal, rendered as e.g. `ip_address_2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    pub(crate) kind: FieldKind,
    pub(crate) ordinal: u32,
}

impl FieldKey {
    pub(crate) const fn new(kind: FieldKind, ordinal: u32) -> Self {
        Self { kind, ordinal }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.as_str(), self.ordinal)
    }
}

#[cfg(test)]
impl std::str::FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, ordinal) = s
            .rsplit_once('_')
            .ok_or_else(|| format!("Invalid field key: '{s}'"))?;

        let kind = FieldKind::ALL
            .into_iter()
            .find(|k| k.as_str() == kind)
            .ok_or_else(|| format!("Unknown field kind in key: '{s}'"))?;

        match ordinal.parse::<u32>() {
            Ok(ordinal) if ordinal > 0 => Ok(FieldKey::new(kind, ordinal)),
            _ => Err(format!("Invalid ordinal in key: '{s}'")),
        }
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Any value that can be compared between a device configuration and its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Hostname,
    Location,
    SerialNumber,
    SystemIp,
    Interface(FieldKey),
}

impl Field {
    /// Device-level fields in report order.
    pub(crate) const SCALARS: [Field; 4] = [
        Field::Hostname,
        Field::Location,
        Field::SerialNumber,
        Field::SystemIp,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Hostname => f.write_str("hostname"),
            Field::Location => f.write_str("location"),
            Field::SerialNumber => f.write_str("serial_number"),
            Field::SystemIp => f.write_str("system_ip"),
            Field::Interface(key) => key.fmt(f),
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Serialize, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct InterfaceRecord {
    pub(crate) name: String,
    pub(crate) fields: BTreeMap<FieldKey, String>,
}

#[derive(Serialize, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct DeviceRecord {
    pub(crate) hostname: String,
    pub(crate) serial_number: String,
    pub(crate) location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) system_ip: Option<String>,
    pub(crate) interfaces: Vec<InterfaceRecord>,
}

impl DeviceRecord {
    /// Value of a device-level field as it appears in the report.
    pub(crate) fn scalar(&self, field: Field) -> Option<&str> {
        match field {
            Field::Hostname => Some(&self.hostname),
            Field::Location => Some(&self.location),
            Field::SerialNumber => Some(&self.serial_number),
            Field::SystemIp => self.system_ip.as_deref(),
            Field::Interface(_) => None,
        }
    }
}

/// Reference values keyed by the same namespace the extractor produces.
pub type NormalizedReference = BTreeMap<Field, String>;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Matched,
    Mismatched,
}

impl MatchStatus {
    pub(crate) fn of(config_value: &str, reference_value: &str) -> Self {
        if config_value == reference_value {
            MatchStatus::Matched
        } else {
            MatchStatus::Mismatched
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Matched => f.write_str("Matched"),
            MatchStatus::Mismatched => f.write_str("Mismatched"),
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ComparisonRow {
    pub(crate) field: Field,
    pub(crate) config_value: String,
    pub(crate) reference_value: String,
    pub(crate) interface: Option<String>,
    pub(crate) status: MatchStatus,
}
