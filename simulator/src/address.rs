use std::fmt;
use std::net::Ipv4Addr;

/// An IPv4 network in CIDR notation, e.g. `10.0.0.0/24`.
/// Host bits of the base address are masked off on construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subnet {
    base: u32,
    prefix: u8,
}

impl Subnet {
    pub fn new(base: Ipv4Addr, prefix: u8) -> Self {
        assert!(prefix <= 32, "prefix length {} out of range", prefix);
        let mask = mask_bits(prefix);
        Subnet {
            base: u32::from(base) & mask,
            prefix,
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.base)
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Total number of addresses in the block.
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }

    /// Number of assignable host addresses. The network and broadcast
    /// addresses are excluded, so /31 and /32 blocks have none.
    pub fn usable_hosts(&self) -> u64 {
        if self.prefix >= 31 {
            0
        } else {
            self.size() - 2
        }
    }

    /// The n-th usable host address, 1-based. `None` outside the block.
    pub fn host(&self, n: u64) -> Option<Ipv4Addr> {
        if n == 0 || n > self.usable_hosts() {
            return None;
        }
        Some(Ipv4Addr::from(self.base + n as u32))
    }

    pub fn contains(&self, address: Ipv4Addr) -> bool {
        u32::from(address) & mask_bits(self.prefix) == self.base
    }

    /// Two blocks overlap iff one contains the other's network address.
    pub fn overlaps(&self, other: &Subnet) -> bool {
        self.contains(other.network()) || other.contains(self.network())
    }

    /// The next same-sized block, following this one in address order.
    pub fn next_network(&self) -> Subnet {
        Subnet {
            base: self.base.wrapping_add(self.size() as u32),
            prefix: self.prefix,
        }
    }
}

fn mask_bits(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        !0u32 << (32 - u32::from(prefix))
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(s: &str, prefix: u8) -> Subnet {
        Subnet::new(s.parse().unwrap(), prefix)
    }

    #[test]
    fn masks_host_bits_of_the_base() {
        let s = subnet("10.0.0.77", 24);
        assert_eq!(s.network(), "10.0.0.0".parse::<Ipv4Addr>().unwrap());
        assert_eq!(s.to_string(), "10.0.0.0/24");
    }

    #[test]
    fn slash_30_has_exactly_two_hosts() {
        let s = subnet("10.0.0.0", 30);
        assert_eq!(s.usable_hosts(), 2);
        assert_eq!(s.host(1), Some("10.0.0.1".parse().unwrap()));
        assert_eq!(s.host(2), Some("10.0.0.2".parse().unwrap()));
        assert_eq!(s.host(3), None);
        assert_eq!(s.host(0), None);
    }

    #[test]
    fn tiny_blocks_have_no_usable_hosts() {
        assert_eq!(subnet("10.0.0.0", 31).usable_hosts(), 0);
        assert_eq!(subnet("10.0.0.0", 32).usable_hosts(), 0);
        assert_eq!(subnet("10.0.0.0", 31).host(1), None);
    }

    #[test]
    fn containment_respects_the_mask() {
        let s = subnet("10.0.1.0", 24);
        assert!(s.contains("10.0.1.255".parse().unwrap()));
        assert!(!s.contains("10.0.2.0".parse().unwrap()));
    }

    #[test]
    fn overlap_covers_nesting_and_equality() {
        let wide = subnet("10.0.0.0", 16);
        let narrow = subnet("10.0.3.0", 24);
        let elsewhere = subnet("10.1.0.0", 24);
        assert!(wide.overlaps(&narrow));
        assert!(narrow.overlaps(&wide));
        assert!(narrow.overlaps(&narrow));
        assert!(!narrow.overlaps(&elsewhere));
    }

    #[test]
    fn next_network_yields_adjacent_disjoint_blocks() {
        let first = subnet("10.0.0.0", 24);
        let second = first.next_network();
        assert_eq!(second.to_string(), "10.0.1.0/24");
        assert!(!first.overlaps(&second));

        let tight = subnet("10.0.0.0", 30).next_network();
        assert_eq!(tight.network(), "10.0.0.4".parse::<Ipv4Addr>().unwrap());
    }
}
