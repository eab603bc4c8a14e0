use std::fs;
use std::path::Path;

use crate::error::ValidationError;
use crate::types::{DeviceRecord, FieldKey, FieldKind, InterfaceRecord};

const DEFAULT_HOSTNAME: &str = "unknown";
const DEFAULT_SERIAL_NUMBER: &str = "not available";
const DEFAULT_LOCATION: &str = "unknown";

/// Interface whose address doubles as the device system IP.
const SYSTEM_IP_INTERFACE: &str = "Loopback0";

pub(crate) fn read_text(path: &Path) -> Result<String, ValidationError> {
    fs::read_to_string(path).map_err(|e| ValidationError::from_io(path, e))
}

/// Parse an IOS-XE style running configuration into a [`DeviceRecord`].
///
/// Never fails. Lines are scanned once: top-level lines are checked for the device
/// scalars and for `interface` headers, indented lines belong to the interface block
/// opened by the most recent supported header (if any).
pub(crate) fn extract(text: &str) -> DeviceRecord {
    let mut hostname = None;
    let mut serial_number = None;
    let mut location = None;
    let mut blocks = Vec::new();
    let mut current: Option<InterfaceBlock> = None;

    for line in text.lines() {
        if line.is_empty() || line.starts_with(char::is_whitespace) {
            if let Some(block) = current.as_mut() {
                block.scan(line.trim_start());
            }
            continue;
        }

        blocks.extend(current.take());

        if hostname.is_none() {
            hostname = parse_hostname(line);
        }
        if serial_number.is_none() {
            serial_number = parse_serial_number(line);
        }
        if location.is_none() {
            location = parse_location(line);
        }

        current = parse_interface_header(line).map(InterfaceBlock::new);
    }
    blocks.extend(current);

    let mut counters = OrdinalCounters::default();
    let mut system_ip = None;
    let mut interfaces = Vec::with_capacity(blocks.len());

    for block in blocks {
        if block.name == SYSTEM_IP_INTERFACE {
            if let Some((address, _)) = &block.ip_address {
                system_ip = Some(address.clone());
            }
        }
        interfaces.push(block.into_record(&mut counters));
    }

    DeviceRecord {
        hostname: hostname.unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
        serial_number: serial_number.unwrap_or_else(|| DEFAULT_SERIAL_NUMBER.to_string()),
        location: location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        system_ip,
        interfaces,
    }
}

/// Running per-kind ordinals shared by every interface of one device.
#[derive(Debug, Default)]
struct OrdinalCounters {
    ip_address: u32,
    description: u32,
    dot1q_vlan: u32,
}

impl OrdinalCounters {
    fn next(&mut self, kind: FieldKind) -> FieldKey {
        let counter = match kind {
            FieldKind::IpAddress => &mut self.ip_address,
            FieldKind::Description => &mut self.description,
            FieldKind::Dot1qVlan => &mut self.dot1q_vlan,
        };
        *counter += 1;

        FieldKey::new(kind, *counter)
    }
}

#[derive(Debug)]
struct InterfaceBlock {
    name: String,
    description: Option<String>,
    ip_address: Option<(String, String)>,
    dot1q_vlan: Option<String>,
}

impl InterfaceBlock {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            ip_address: None,
            dot1q_vlan: None,
        }
    }

    // First match wins for every field.
    fn scan(&mut self, line: &str) {
        if self.description.is_none() {
            self.description = parse_description(line);
        }
        if self.ip_address.is_none() {
            self.ip_address = parse_ip_address(line);
        }
        if self.dot1q_vlan.is_none() {
            self.dot1q_vlan = parse_dot1q_vlan(line);
        }
    }

    fn into_record(self, counters: &mut OrdinalCounters) -> InterfaceRecord {
        let values = [
            (
                FieldKind::IpAddress,
                self.ip_address.map(|(address, mask)| format!("{address} {mask}")),
            ),
            (FieldKind::Description, self.description),
            (FieldKind::Dot1qVlan, self.dot1q_vlan),
        ];

        let fields = values
            .into_iter()
            .filter_map(|(kind, value)| value.map(|value| (counters.next(kind), value)))
            .collect();

        InterfaceRecord {
            name: self.name,
            fields,
        }
    }
}

/// Strip the leading `keywords` from `line`, each of which must be followed by whitespace.
/// Returns the remainder with leading whitespace removed.
fn strip_keywords<'a>(line: &'a str, keywords: &[&str]) -> Option<&'a str> {
    keywords.iter().try_fold(line, |rest, keyword| {
        rest.strip_prefix(keyword)
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .map(str::trim_start)
    })
}

fn parse_hostname(line: &str) -> Option<String> {
    strip_keywords(line, &["hostname"])?
        .split_whitespace()
        .next()
        .map(str::to_string)
}

fn parse_serial_number(line: &str) -> Option<String> {
    let mut tokens = strip_keywords(line, &["license", "udi", "pid"])?.split_whitespace();

    let pid = tokens.next()?;
    if tokens.next()? != "sn" {
        return None;
    }
    let sn = tokens.next()?;

    Some(format!("{pid}-{sn}"))
}

fn parse_location(line: &str) -> Option<String> {
    strip_keywords(line, &["snmp-server location"])
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}

fn parse_interface_header(line: &str) -> Option<&str> {
    strip_keywords(line, &["interface"])?
        .split_whitespace()
        .next()
        .filter(|name| is_supported_interface(name))
}

/// `GigabitEthernet` followed by a numeric slot/port path, or `Loopback` followed by digits.
fn is_supported_interface(name: &str) -> bool {
    if let Some(path) = name.strip_prefix("GigabitEthernet") {
        !path.is_empty()
            && path
                .chars()
                .all(|c| c.is_ascii_digit() || c == '/' || c == '.')
    } else if let Some(number) = name.strip_prefix("Loopback") {
        !number.is_empty() && number.chars().all(|c| c.is_ascii_digit())
    } else {
        false
    }
}

fn parse_description(line: &str) -> Option<String> {
    strip_keywords(line, &["description"])
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}

fn parse_ip_address(line: &str) -> Option<(String, String)> {
    let mut tokens = strip_keywords(line, &["ip address"])?.split_whitespace();

    let address = tokens.next()?;
    let mask = tokens.next()?;

    Some((address.to_string(), mask.to_string()))
}

fn parse_dot1q_vlan(line: &str) -> Option<String> {
    let rest = strip_keywords(line, &["encapsulation", "dot1Q"])?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    Some(&rest[..end])
        .filter(|vlan| !vlan.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::Path;

    use crate::error::ValidationError;
    use crate::extract::{extract, is_supported_interface, read_text, strip_keywords};
    use crate::types::{DeviceRecord, FieldKey, FieldKind, InterfaceRecord};

    fn field(record: &InterfaceRecord, key: &str) -> Option<String> {
        record.fields.get(&key.parse::<FieldKey>().unwrap()).cloned()
    }

    #[test]
    fn extract_hostname_only() {
        let record = extract("hostname R1\n!\nend\n");

        assert_eq!(
            record,
            DeviceRecord {
                hostname: "R1".to_string(),
                serial_number: "not available".to_string(),
                location: "unknown".to_string(),
                system_ip: None,
                interfaces: vec![],
            }
        );
    }

    #[test]
    fn extract_empty_text_uses_defaults() {
        let record = extract("");

        assert_eq!(record.hostname, "unknown");
        assert_eq!(record.serial_number, "not available");
        assert_eq!(record.location, "unknown");
        assert!(record.system_ip.is_none());
        assert!(record.interfaces.is_empty());
    }

    #[test]
    fn extract_scalars() {
        let config = "\
hostname   EDGE-01
license udi pid ISR1100-4G sn FGL2231A0BC
snmp-server location 5th Avenue, New York
snmp-server contact noc@example.com
";
        let record = extract(config);

        assert_eq!(record.hostname, "EDGE-01");
        assert_eq!(record.serial_number, "ISR1100-4G-FGL2231A0BC");
        assert_eq!(record.location, "5th Avenue, New York");
    }

    #[test]
    fn extract_scalars_first_match_wins() {
        let config = "\
hostname first
hostname second
snmp-server location A
snmp-server location B
";
        let record = extract(config);

        assert_eq!(record.hostname, "first");
        assert_eq!(record.location, "A");
    }

    #[test]
    fn extract_scalars_must_start_the_line() {
        let config = concat!(
            " hostname indented\n",
            "hostnames R1\n",
            "license udi pid ISR1100 serial X\n",
            "snmp-server locationX foo\n",
        );
        let record = extract(config);

        assert_eq!(record.hostname, "unknown");
        assert_eq!(record.serial_number, "not available");
        assert_eq!(record.location, "unknown");
    }

    #[test]
    fn extract_loopback0_sets_system_ip() {
        let config = "\
interface Loopback0
 ip address 10.0.0.1 255.255.255.255
!
";
        let record = extract(config);

        assert_eq!(record.system_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(record.interfaces.len(), 1);
        assert_eq!(record.interfaces[0].name, "Loopback0");
        assert_eq!(
            field(&record.interfaces[0], "ip_address_1").as_deref(),
            Some("10.0.0.1 255.255.255.255")
        );
    }

    #[test]
    fn extract_other_loopbacks_do_not_set_system_ip() {
        let config = "\
interface Loopback1
 ip address 10.0.0.2 255.255.255.255
!
";
        let record = extract(config);

        assert!(record.system_ip.is_none());
        assert_eq!(
            field(&record.interfaces[0], "ip_address_1").as_deref(),
            Some("10.0.0.2 255.255.255.255")
        );
    }

    #[test]
    fn extract_descriptions_in_block_order() {
        let config = "\
interface GigabitEthernet0/0/0
 description WAN uplink
!
interface GigabitEthernet0/0/1
 description LAN trunk
!
";
        let record = extract(config);

        assert_eq!(record.interfaces.len(), 2);
        assert_eq!(
            field(&record.interfaces[0], "description_1").as_deref(),
            Some("WAN uplink")
        );
        assert_eq!(
            field(&record.interfaces[1], "description_2").as_deref(),
            Some("LAN trunk")
        );
    }

    #[test]
    fn extract_ordinals_are_shared_across_interfaces() {
        let config = "\
interface GigabitEthernet0/0/1
 description no address here
 no ip address
!
interface GigabitEthernet0/0/1.10
 encapsulation dot1Q 10 native
 ip address 192.168.10.1 255.255.255.0
!
interface GigabitEthernet0/0/2
 description second
 ip address 172.16.0.1 255.255.255.252
!
";
        let record = extract(config);
        let interfaces = &record.interfaces;

        assert_eq!(
            interfaces[0].fields,
            BTreeMap::from([(
                FieldKey::new(FieldKind::Description, 1),
                "no address here".to_string()
            )])
        );
        assert_eq!(
            interfaces[1].fields,
            BTreeMap::from([
                (
                    FieldKey::new(FieldKind::IpAddress, 1),
                    "192.168.10.1 255.255.255.0".to_string()
                ),
                (FieldKey::new(FieldKind::Dot1qVlan, 1), "10".to_string()),
            ])
        );
        assert_eq!(
            interfaces[2].fields,
            BTreeMap::from([
                (
                    FieldKey::new(FieldKind::IpAddress, 2),
                    "172.16.0.1 255.255.255.252".to_string()
                ),
                (FieldKey::new(FieldKind::Description, 2), "second".to_string()),
            ])
        );
    }

    #[test]
    fn extract_block_fields_first_match_wins() {
        let config = "\
interface GigabitEthernet1
 description one
 description two
 ip address 10.1.1.1 255.255.255.0
 ip address 10.2.2.2 255.255.255.0 secondary
!
";
        let record = extract(config);

        assert_eq!(
            field(&record.interfaces[0], "description_1").as_deref(),
            Some("one")
        );
        assert_eq!(
            field(&record.interfaces[0], "ip_address_1").as_deref(),
            Some("10.1.1.1 255.255.255.0")
        );
        assert_eq!(record.interfaces[0].fields.len(), 2);
    }

    #[test]
    fn extract_skips_unsupported_interfaces() {
        let config = "\
interface Vlan1
 description management
 ip address 192.168.1.1 255.255.255.0
!
interface Tunnel0
 ip address 10.9.9.9 255.255.255.0
!
interface GigabitEthernet0/0/0
 ip address 203.0.113.2 255.255.255.252
!
";
        let record = extract(config);

        assert_eq!(record.interfaces.len(), 1);
        assert_eq!(record.interfaces[0].name, "GigabitEthernet0/0/0");
        assert_eq!(
            field(&record.interfaces[0], "ip_address_1").as_deref(),
            Some("203.0.113.2 255.255.255.252")
        );
        assert!(field(&record.interfaces[0], "description_1").is_none());
    }

    #[test]
    fn extract_block_ends_at_next_top_level_line() {
        let config = "\
interface GigabitEthernet0/0/0

 description spans a blank line
ip route 0.0.0.0 0.0.0.0 203.0.113.1
 description not part of the interface
";
        let record = extract(config);

        assert_eq!(record.interfaces.len(), 1);
        assert_eq!(
            field(&record.interfaces[0], "description_1").as_deref(),
            Some("spans a blank line")
        );
    }

    #[test]
    fn extract_trailing_block_closes_at_end_of_text() {
        let config = "hostname R1\ninterface Loopback0\n ip address 1.1.1.1 255.255.255.255";
        let record = extract(config);

        assert_eq!(record.system_ip.as_deref(), Some("1.1.1.1"));
        assert_eq!(record.interfaces.len(), 1);
    }

    #[test]
    fn extract_duplicate_headers_are_independent() {
        let config = "\
interface GigabitEthernet0/0/1
 description first
!
interface GigabitEthernet0/0/1
 description again
!
";
        let record = extract(config);

        assert_eq!(record.interfaces.len(), 2);
        assert_eq!(
            field(&record.interfaces[0], "description_1").as_deref(),
            Some("first")
        );
        assert_eq!(
            field(&record.interfaces[1], "description_2").as_deref(),
            Some("again")
        );
    }

    #[test]
    fn extract_handles_crlf_line_endings() {
        let config = "hostname R1\r\ninterface GigabitEthernet1\r\n description up\r\n!\r\n";
        let record = extract(config);

        assert_eq!(record.hostname, "R1");
        assert_eq!(
            field(&record.interfaces[0], "description_1").as_deref(),
            Some("up")
        );
    }

    #[test]
    fn extract_dot1q_takes_leading_digits() {
        let config = "\
interface GigabitEthernet0/0/1.20
 encapsulation dot1Q 20 second-dot1q 30
interface GigabitEthernet0/0/1.30
 encapsulation dot1Q native
";
        let record = extract(config);

        assert_eq!(
            field(&record.interfaces[0], "dot1q_vlan_1").as_deref(),
            Some("20")
        );
        assert!(record.interfaces[1].fields.is_empty());
    }

    #[test]
    fn extract_ordinals_are_dense() {
        let config = read_text(Path::new("testdata/validate/edge-router.cfg")).unwrap();
        let record = extract(&config);

        for kind in FieldKind::ALL {
            let ordinals: Vec<u32> = record
                .interfaces
                .iter()
                .flat_map(|i| i.fields.keys())
                .filter(|key| key.kind == kind)
                .map(|key| key.ordinal)
                .collect();

            let expected: Vec<u32> = (1..=ordinals.len() as u32).collect();
            assert_eq!(ordinals, expected, "ordinals for {kind:?}");
        }
    }

    #[test]
    fn extract_is_deterministic() {
        let config = read_text(Path::new("testdata/validate/edge-router.cfg")).unwrap();

        assert_eq!(extract(&config), extract(&config));
    }

    #[test]
    fn extract_config_file() {
        let config = read_text(Path::new("testdata/validate/edge-router.cfg")).unwrap();
        let record = extract(&config);

        assert_eq!(record.hostname, "EDGE-NYC-01");
        assert_eq!(record.serial_number, "ISR1100-4G-FGL2231A0BC");
        assert_eq!(record.location, "NYC-DC1");
        assert_eq!(record.system_ip.as_deref(), Some("10.255.0.1"));

        let names: Vec<&str> = record.interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Loopback0",
                "GigabitEthernet0/0/1.10",
                "GigabitEthernet0/0/1",
                "GigabitEthernet0/0/0",
                "GigabitEthernet0/0/2",
                "GigabitEthernet0",
            ]
        );
    }

    #[test]
    fn read_text_fails_due_to_missing_file() {
        let error = read_text(Path::new("<missing>")).unwrap_err();
        assert!(matches!(error, ValidationError::NotFound { .. }));
    }

    #[test]
    fn strip_keywords_requires_whitespace_separation() {
        assert_eq!(
            strip_keywords("license  udi\tpid X sn Y", &["license", "udi", "pid"]),
            Some("X sn Y")
        );
        assert_eq!(strip_keywords("hostnameR1", &["hostname"]), None);
        assert_eq!(strip_keywords("ip  address 1.1.1.1", &["ip address"]), None);
    }

    #[test]
    fn supported_interface_names() {
        assert!(is_supported_interface("GigabitEthernet0/0/1"));
        assert!(is_supported_interface("GigabitEthernet0/0/1.100"));
        assert!(is_supported_interface("GigabitEthernet1"));
        assert!(is_supported_interface("Loopback0"));
        assert!(is_supported_interface("Loopback65535"));

        assert!(!is_supported_interface("GigabitEthernet"));
        assert!(!is_supported_interface("Loopback"));
        assert!(!is_supported_interface("Loopback0.1"));
        assert!(!is_supported_interface("TenGigabitEthernet0/1/0"));
        assert!(!is_supported_interface("Vlan10"));
    }
}
