use crate::types::{
    ComparisonRow, DeviceRecord, Field, FieldKey, FieldKind, MatchStatus, NormalizedReference,
    NOT_AVAILABLE,
};

// TODO: drop once the reference template defines more than four ip_address columns;
// until then the sixth address has no counterpart and its alignment is unverified.
const EXCLUDED_FIELD: FieldKey = FieldKey::new(FieldKind::IpAddress, 6);

/// Compare every field of `record` with the value the reference expects for it.
///
/// Device-level fields come first, then each interface's fields in discovery order.
pub(crate) fn reconcile(
    record: &DeviceRecord,
    reference: &NormalizedReference,
) -> Vec<ComparisonRow> {
    let scalars = Field::SCALARS.into_iter().map(|field| {
        compare(
            field,
            record.scalar(field).unwrap_or(NOT_AVAILABLE),
            reference,
            None,
        )
    });

    let interfaces = record.interfaces.iter().flat_map(|interface| {
        interface
            .fields
            .iter()
            .filter(|(key, _)| **key != EXCLUDED_FIELD)
            .map(move |(key, value)| {
                compare(
                    Field::Interface(*key),
                    value,
                    reference,
                    Some(interface.name.as_str()),
                )
            })
    });

    scalars.chain(interfaces).collect()
}

fn compare(
    field: Field,
    config_value: &str,
    reference: &NormalizedReference,
    interface: Option<&str>,
) -> ComparisonRow {
    let reference_value = reference
        .get(&field)
        .map(String::as_str)
        .unwrap_or(NOT_AVAILABLE);

    ComparisonRow {
        field,
        config_value: config_value.to_string(),
        reference_value: reference_value.to_string(),
        interface: interface.map(str::to_string),
        status: MatchStatus::of(config_value, reference_value),
    }
}

/// Interface fields left out of the comparison, as `(interface name, key)`.
pub(crate) fn excluded_fields(record: &DeviceRecord) -> Vec<(&str, FieldKey)> {
    record
        .interfaces
        .iter()
        .filter(|interface| interface.fields.contains_key(&EXCLUDED_FIELD))
        .map(|interface| (interface.name.as_str(), EXCLUDED_FIELD))
        .collect()
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ReconcileSummary {
    pub(crate) matched: usize,
    pub(crate) mismatched: usize,
}

impl ReconcileSummary {
    pub(crate) fn from_rows(rows: &[ComparisonRow]) -> Self {
        rows.iter().fold(ReconcileSummary::default(), |mut summary, row| {
            match row.status {
                MatchStatus::Matched => summary.matched += 1,
                MatchStatus::Mismatched => summary.mismatched += 1,
            }
            summary
        })
    }
}
