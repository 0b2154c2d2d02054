// Override table: the name → address mapping served ahead of upstream
// forwarding. Built fresh from controller data each refresh cycle and
// never mutated afterwards; consumers swap whole snapshots.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use omada_api::models::{NetworkInfo, Reservation};

use crate::error::CoreError;

/// TTL served with locally-answered records.
pub const DEFAULT_TTL: u32 = 301;

/// One local answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideAnswer {
    pub address: Ipv4Addr,
    pub ttl: u32,
}

/// Immutable mapping from lowercase name (bare label, MAC, or
/// `label.domain`) to its local answer.
#[derive(Debug, Default)]
pub struct OverrideTable {
    entries: HashMap<String, OverrideAnswer>,
}

impl OverrideTable {
    /// Build a table from one refresh cycle's controller data.
    ///
    /// Each reservation contributes the candidate names {description,
    /// mac, clientName-if-distinct-from-mac}; every candidate registers
    /// both the bare name and `name.domain`, the domain coming from the
    /// reservation's owning network. Later reservations overwrite earlier
    /// ones on name collision.
    ///
    /// A reservation pointing at an unknown network, or carrying an
    /// unparsable address, fails the whole build.
    pub fn build(
        networks: &[NetworkInfo],
        reservations: &[Reservation],
    ) -> Result<Self, CoreError> {
        let domains: HashMap<&str, &NetworkInfo> =
            networks.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut entries = HashMap::new();
        for r in reservations {
            let network = domains
                .get(r.net_id.as_str())
                .ok_or_else(|| CoreError::MissingNetwork {
                    net_id: r.net_id.clone(),
                    mac: r.mac.clone(),
                })?;

            let address: Ipv4Addr = r.ip.parse().map_err(|_| CoreError::InvalidAddress {
                value: r.ip.clone(),
                mac: r.mac.clone(),
            })?;
            let answer = OverrideAnswer {
                address,
                ttl: DEFAULT_TTL,
            };

            let mut names = vec![r.description.as_str(), r.mac.as_str()];
            if r.client_name != r.mac {
                names.push(r.client_name.as_str());
            }

            for name in names {
                entries.insert(name.to_ascii_lowercase(), answer.clone());
                entries.insert(
                    format!("{name}.{}", network.domain).to_ascii_lowercase(),
                    answer.clone(),
                );
            }
        }

        Ok(Self { entries })
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&OverrideAnswer> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn network(id: &str, domain: &str) -> NetworkInfo {
        NetworkInfo {
            id: id.into(),
            name: format!("net-{id}"),
            domain: domain.into(),
        }
    }

    fn reservation(description: &str, mac: &str, client_name: &str, ip: &str, net_id: &str) -> Reservation {
        Reservation {
            description: description.into(),
            mac: mac.into(),
            client_name: client_name.into(),
            ip: ip.into(),
            net_id: net_id.into(),
        }
    }

    #[test]
    fn client_name_equal_to_mac_yields_four_entries() {
        let networks = [network("n1", "lan")];
        let reservations = [reservation(
            "printer",
            "AA:BB:CC:DD:EE:FF",
            "AA:BB:CC:DD:EE:FF",
            "10.0.0.5",
            "n1",
        )];

        let table = OverrideTable::build(&networks, &reservations).unwrap();

        assert_eq!(table.len(), 4);
        for name in [
            "printer",
            "printer.lan",
            "aa:bb:cc:dd:ee:ff",
            "aa:bb:cc:dd:ee:ff.lan",
        ] {
            let answer = table.lookup(name).unwrap();
            assert_eq!(answer.address, Ipv4Addr::new(10, 0, 0, 5));
            assert_eq!(answer.ttl, DEFAULT_TTL);
        }
    }

    #[test]
    fn distinct_client_name_yields_six_entries() {
        let networks = [network("n1", "lan")];
        let reservations = [reservation(
            "nas",
            "11:22:33:44:55:66",
            "synology",
            "10.0.0.9",
            "n1",
        )];

        let table = OverrideTable::build(&networks, &reservations).unwrap();

        assert_eq!(table.len(), 6);
        assert!(table.lookup("synology").is_some());
        assert!(table.lookup("synology.lan").is_some());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let networks = [network("n1", "lan")];
        let reservations = [reservation("Apple", "aa:aa:aa:aa:aa:aa", "Apple-TV", "10.0.0.7", "n1")];

        let table = OverrideTable::build(&networks, &reservations).unwrap();

        assert_eq!(table.lookup("Apple"), table.lookup("apple"));
        assert!(table.lookup("APPLE.LAN").is_some());
        assert!(table.lookup("apple-tv").is_some());
    }

    #[test]
    fn later_reservation_wins_name_collision() {
        let networks = [network("n1", "lan")];
        let reservations = [
            reservation("printer", "aa:aa:aa:aa:aa:01", "aa:aa:aa:aa:aa:01", "10.0.0.5", "n1"),
            reservation("printer", "aa:aa:aa:aa:aa:02", "aa:aa:aa:aa:aa:02", "10.0.0.6", "n1"),
        ];

        let table = OverrideTable::build(&networks, &reservations).unwrap();

        assert_eq!(
            table.lookup("printer").unwrap().address,
            Ipv4Addr::new(10, 0, 0, 6)
        );
    }

    #[test]
    fn unknown_network_fails_the_build() {
        let networks = [network("n1", "lan")];
        let reservations = [reservation(
            "printer",
            "aa:aa:aa:aa:aa:01",
            "aa:aa:aa:aa:aa:01",
            "10.0.0.5",
            "n2",
        )];

        let result = OverrideTable::build(&networks, &reservations);

        assert!(
            matches!(result, Err(CoreError::MissingNetwork { ref net_id, .. }) if net_id == "n2"),
            "expected MissingNetwork, got: {result:?}"
        );
    }

    #[test]
    fn unparsable_address_fails_the_build() {
        let networks = [network("n1", "lan")];
        let reservations = [reservation(
            "printer",
            "aa:aa:aa:aa:aa:01",
            "aa:aa:aa:aa:aa:01",
            "not-an-ip",
            "n1",
        )];

        let result = OverrideTable::build(&networks, &reservations);

        assert!(
            matches!(result, Err(CoreError::InvalidAddress { ref value, .. }) if value == "not-an-ip"),
            "expected InvalidAddress, got: {result:?}"
        );
    }
}
