use std::fs;
use std::path::Path;

use crate::error::ValidationError;
use crate::types::{Field, FieldKey, FieldKind, NormalizedReference};

const UTF8_BOM: char = '\u{feff}';

/// Reference template column names and the field each one is compared against.
///
/// The interface ordinals mirror the order in which the extractor numbers interface
/// fields on the standard edge template, so the two tables change together.
const ALIASES: [(&str, Field); 12] = [
    ("csv-deviceId", Field::SerialNumber),
    ("location", Field::Location),
    ("host-name", Field::Hostname),
    ("system-ip", Field::SystemIp),
    ("Loopback0", interface(FieldKind::IpAddress, 1)),
    ("LAN10-IP-Address", interface(FieldKind::IpAddress, 2)),
    ("LAN10-Description", interface(FieldKind::Description, 1)),
    ("LAN10-VLAN-ID", interface(FieldKind::Dot1qVlan, 1)),
    ("WAN1-IP-Addr", interface(FieldKind::IpAddress, 3)),
    ("WAN1-Descr", interface(FieldKind::Description, 3)),
    ("WAN2-IP-Addr", interface(FieldKind::IpAddress, 4)),
    ("WAN2-descr", interface(FieldKind::Description, 4)),
];

const fn interface(kind: FieldKind, ordinal: u32) -> Field {
    Field::Interface(FieldKey::new(kind, ordinal))
}

fn lookup(key: &str) -> Option<Field> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, field)| *field)
}

fn clean_key(key: &str) -> &str {
    key.trim_start_matches(UTF8_BOM).trim()
}

/// Read a delimited reference table. Every row is returned as-is, including the header.
pub(crate) fn read_table(path: &Path) -> Result<Vec<Vec<String>>, ValidationError> {
    let data = fs::read(path).map_err(|e| ValidationError::from_io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_slice());

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .map_err(|e| {
                    ValidationError::MalformedInput(format!(
                        "Reading {}: {e}",
                        path.display()
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    ensure_two_rows(&rows)?;

    Ok(rows)
}

fn ensure_two_rows(rows: &[Vec<String>]) -> Result<(), ValidationError> {
    if rows.len() < 2 {
        return Err(ValidationError::MalformedInput(format!(
            "Reference table must have at least two rows (variables and values), found {}",
            rows.len()
        )));
    }

    Ok(())
}

/// Normalize a reference table whose first row names the variables and whose second
/// row holds their values. Any further rows are ignored.
pub(crate) fn normalize(rows: &[Vec<String>]) -> Result<NormalizedReference, ValidationError> {
    ensure_two_rows(rows)?;

    Ok(normalize_pairs(&rows[0], &rows[1]))
}

/// Pair keys with values by position and keep the ones the alias table knows.
pub(crate) fn normalize_pairs<K, V>(keys: &[K], values: &[V]) -> NormalizedReference
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    keys.iter()
        .zip(values)
        .filter_map(|(key, value)| {
            lookup(clean_key(key.as_ref())).map(|field| (field, value.as_ref().trim().to_string()))
        })
        .collect()
}

/// Header entries the alias table does not recognise, in header order.
pub(crate) fn unmapped_keys(header: &[String]) -> Vec<&str> {
    header
        .iter()
        .map(|key| clean_key(key))
        .filter(|key| lookup(key).is_none())
        .collect()
}
