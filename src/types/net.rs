//! Email addresses, IP networks and interfaces, MAC addresses.

use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    sync::LazyLock,
};

use regex::Regex;

use crate::error::ValidationError;

use super::impl_validated_str;

/// RFC 5321 overall length limit.
const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$",
    )
    .expect("invalid email pattern")
});

/// A validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailStr {
    email: String,
}

impl EmailStr {
    /// Validates a raw email address.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::new("email address cannot be empty"));
        }
        if value.len() > MAX_EMAIL_LENGTH {
            return Err(ValidationError::new(format!(
                "email address is longer than {MAX_EMAIL_LENGTH} characters"
            )));
        }
        if !EMAIL_PATTERN.is_match(value) {
            return Err(ValidationError::new(format!(
                "invalid email address: {value:?}"
            )));
        }
        let (_, domain) = value
            .rsplit_once('@')
            .ok_or_else(|| ValidationError::new(format!("invalid email address: {value:?}")))?;
        if domain.len() > 255 {
            return Err(ValidationError::new("email domain is too long"));
        }
        Ok(Self {
            email: value.to_owned(),
        })
    }

    /// The validated address.
    pub fn as_str(&self) -> &str {
        &self.email
    }

    /// The part after the final `@`.
    pub fn domain(&self) -> &str {
        self.email.rsplit_once('@').map_or("", |(_, domain)| domain)
    }
}

impl_validated_str!(EmailStr);

/// An IP network in CIDR form.
///
/// The address must be the network address proper, with all host bits zero;
/// use [`IpInterface`] for host addresses carrying a prefix. An address
/// without `/prefix` denotes a single-address network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IpNetwork {
    raw: String,
    addr: IpAddr,
    prefix: u8,
}

impl IpNetwork {
    /// Validates a CIDR string.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        let (addr, prefix) = parse_cidr(value)?;
        let masked = mask_addr(addr, prefix);
        if masked != addr {
            return Err(ValidationError::new(format!(
                "network {value} has host bits set; the network address is {masked}/{prefix}"
            )));
        }
        Ok(Self {
            raw: value.to_owned(),
            addr,
            prefix,
        })
    }

    /// The CIDR string as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The network address.
    pub fn network_address(&self) -> IpAddr {
        self.addr
    }

    /// The prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.prefix
    }

    /// The netmask corresponding to the prefix length.
    pub fn netmask(&self) -> IpAddr {
        match self.addr {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::from(mask_v4(self.prefix))),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::from(mask_v6(self.prefix))),
        }
    }

    /// The highest address of the network.
    pub fn broadcast_address(&self) -> IpAddr {
        match self.addr {
            IpAddr::V4(addr) => {
                IpAddr::V4(Ipv4Addr::from(u32::from(addr) | !mask_v4(self.prefix)))
            }
            IpAddr::V6(addr) => {
                IpAddr::V6(Ipv6Addr::from(u128::from(addr) | !mask_v6(self.prefix)))
            }
        }
    }

    /// Checks whether the address belongs to this network. Addresses of the
    /// other IP family never match.
    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self.addr, addr) {
            (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => {
                mask_addr(addr, self.prefix) == self.addr
            }
            _ => false,
        }
    }
}

impl_validated_str!(IpNetwork);

/// An IP address with a prefix length, host bits allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IpInterface {
    raw: String,
    addr: IpAddr,
    prefix: u8,
}

impl IpInterface {
    /// Validates an `address/prefix` string.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        let (addr, prefix) = parse_cidr(value)?;
        Ok(Self {
            raw: value.to_owned(),
            addr,
            prefix,
        })
    }

    /// The interface string as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The host address.
    pub fn ip(&self) -> IpAddr {
        self.addr
    }

    /// The prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.prefix
    }

    /// The network this interface belongs to.
    pub fn network(&self) -> IpNetwork {
        let masked = mask_addr(self.addr, self.prefix);
        IpNetwork {
            raw: format!("{masked}/{}", self.prefix),
            addr: masked,
            prefix: self.prefix,
        }
    }
}

impl_validated_str!(IpInterface);

fn parse_cidr(value: &str) -> Result<(IpAddr, u8), ValidationError> {
    let (addr_part, prefix_part) = match value.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (value, None),
    };
    let addr: IpAddr = addr_part
        .parse()
        .map_err(|_| ValidationError::new(format!("invalid IP address: {addr_part:?}")))?;
    let max_prefix = if addr.is_ipv4() { 32 } else { 128 };
    let prefix = match prefix_part {
        Some(prefix) => prefix
            .parse::<u8>()
            .ok()
            .filter(|&prefix| prefix <= max_prefix)
            .ok_or_else(|| ValidationError::new(format!("invalid prefix length: {prefix:?}")))?,
        None => max_prefix,
    };
    Ok((addr, prefix))
}

fn mask_addr(addr: IpAddr, prefix: u8) -> IpAddr {
    match addr {
        IpAddr::V4(addr) => IpAddr::V4(Ipv4Addr::from(u32::from(addr) & mask_v4(prefix))),
        IpAddr::V6(addr) => IpAddr::V6(Ipv6Addr::from(u128::from(addr) & mask_v6(prefix))),
    }
}

fn mask_v4(prefix: u8) -> u32 {
    // A zero prefix would shift by the full bit width.
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    }
}

fn mask_v6(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - prefix)
    }
}

static MAC_CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("invalid MAC pattern"));
static MAC_CISCO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4}$").expect("invalid MAC pattern"));
static MAC_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{12}$").expect("invalid MAC pattern"));

/// A MAC address accepted in colon, hyphen, Cisco dotted or bare hex form.
///
/// Displays in the canonical colon-separated form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacAddress {
    canonical: String,
}

impl MacAddress {
    /// Validates a raw MAC address in any of the accepted formats.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        if !MAC_CANONICAL.is_match(value) && !MAC_CISCO.is_match(value) && !MAC_BARE.is_match(value)
        {
            return Err(ValidationError::new(format!(
                "invalid MAC address: {value:?}"
            )));
        }
        let bare: String = value
            .chars()
            .filter(|ch| ch.is_ascii_hexdigit())
            .collect();
        let canonical = bare
            .as_bytes()
            .chunks(2)
            .map(String::from_utf8_lossy)
            .collect::<Vec<_>>()
            .join(":");
        Ok(Self { canonical })
    }

    /// The canonical colon-separated form.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Cisco dotted form, `aabb.ccdd.eeff`.
    pub fn cisco(&self) -> String {
        let bare = self.bare();
        bare.as_bytes()
            .chunks(4)
            .map(String::from_utf8_lossy)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Bare 12-digit hex form.
    pub fn bare(&self) -> String {
        self.canonical.replace(':', "")
    }

    /// Whether the address is unicast (I/G bit clear).
    pub fn is_unicast(&self) -> bool {
        u8::from_str_radix(&self.canonical[..2], 16).is_ok_and(|byte| byte & 0x01 == 0)
    }

    /// Whether the address is multicast (I/G bit set).
    pub fn is_multicast(&self) -> bool {
        !self.is_unicast()
    }
}

impl_validated_str!(MacAddress);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        let email = EmailStr::validate("user.name+tag@example.co.uk").unwrap();
        assert_eq!(email.domain(), "example.co.uk");

        EmailStr::validate("").unwrap_err();
        EmailStr::validate("plainaddress").unwrap_err();
        EmailStr::validate("user@").unwrap_err();
        EmailStr::validate("@example.com").unwrap_err();
        EmailStr::validate("user@localhost").unwrap_err();

        let long = format!("user@{}.com", "a".repeat(MAX_EMAIL_LENGTH));
        EmailStr::validate(&long).unwrap_err();
    }

    #[test]
    fn ip_network_requires_zero_host_bits() {
        let network = IpNetwork::validate("192.168.1.0/24").unwrap();
        assert_eq!(network.prefix_len(), 24);
        assert_eq!(network.netmask(), "255.255.255.0".parse::<IpAddr>().unwrap());
        assert_eq!(
            network.broadcast_address(),
            "192.168.1.255".parse::<IpAddr>().unwrap()
        );
        assert!(network.contains("192.168.1.17".parse().unwrap()));
        assert!(!network.contains("192.168.2.1".parse().unwrap()));
        assert!(!network.contains("::1".parse().unwrap()));

        let err = IpNetwork::validate("192.168.1.5/24").unwrap_err();
        assert!(err.to_string().contains("host bits"), "{err}");
        IpNetwork::validate("not-an-ip/24").unwrap_err();
        IpNetwork::validate("10.0.0.0/33").unwrap_err();

        // No prefix means a single-address network.
        let single = IpNetwork::validate("10.1.2.3").unwrap();
        assert_eq!(single.prefix_len(), 32);

        let v6 = IpNetwork::validate("2001:db8::/32").unwrap();
        assert!(v6.contains("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn ip_interface_allows_host_bits() {
        let iface = IpInterface::validate("192.168.1.5/24").unwrap();
        assert_eq!(iface.ip(), "192.168.1.5".parse::<IpAddr>().unwrap());
        assert_eq!(iface.network().as_str(), "192.168.1.0/24");
        IpInterface::validate("192.168.1.5/40").unwrap_err();
    }

    #[test]
    fn mac_address_formats() {
        let mac = MacAddress::validate("00:1A:2b:3C:4d:5E").unwrap();
        assert_eq!(mac.as_str(), "00:1A:2b:3C:4d:5E");
        assert_eq!(mac.bare(), "001A2b3C4d5E");
        assert_eq!(mac.cisco(), "001A.2b3C.4d5E");
        assert!(mac.is_unicast());

        let from_cisco = MacAddress::validate("001a.2b3c.4d5e").unwrap();
        assert_eq!(from_cisco.as_str(), "00:1a:2b:3c:4d:5e");
        let from_bare = MacAddress::validate("001a2b3c4d5e").unwrap();
        assert_eq!(from_bare, from_cisco);
        let from_hyphen = MacAddress::validate("00-1a-2b-3c-4d-5e").unwrap();
        assert_eq!(from_hyphen, from_cisco);

        let multicast = MacAddress::validate("01:00:5e:00:00:01").unwrap();
        assert!(multicast.is_multicast());

        MacAddress::validate("00:1a:2b:3c:4d").unwrap_err();
        MacAddress::validate("zz:1a:2b:3c:4d:5e").unwrap_err();
        MacAddress::validate("001a.2b3c").unwrap_err();
    }
}
