//! Addresses and ports (`unit-get`, `open-port`, `close-port`, `opened-ports`).

use crate::env::{self, vars, HookEnv};
use crate::executor::{run, Invocation, ToolRunner};
use crate::{parse, ToolError};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

const UNIT_GET: &str = "unit-get";
const OPEN_PORT: &str = "open-port";
const CLOSE_PORT: &str = "close-port";
const OPENED_PORTS: &str = "opened-ports";

/// An address reported by `unit-get`.
///
/// Some providers report a resolvable hostname instead of an IP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkAddress {
    Ip(IpAddr),
    Hostname(String),
}

impl NetworkAddress {
    /// Returns the IP, if the address is one.
    #[must_use]
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Self::Ip(ip) => Some(*ip),
            Self::Hostname(_) => None,
        }
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "{ip}"),
            Self::Hostname(host) => f.write_str(host),
        }
    }
}

impl FromStr for NetworkAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Ip(ip));
        }
        let valid_host = !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        if valid_host {
            Ok(Self::Hostname(s.to_string()))
        } else {
            Err(format!("'{s}' is neither an IP address nor a hostname"))
        }
    }
}

fn unit_address(runner: &dyn ToolRunner, which: &str) -> Result<NetworkAddress, ToolError> {
    let out = run(runner, &Invocation::new(UNIT_GET).arg(which))?;
    parse::scalar(UNIT_GET, &out)?
        .parse()
        .map_err(|e: String| ToolError::unparsable(UNIT_GET, e))
}

/// Address other units in the model should use.
///
/// # Errors
///
/// `UnparsableResponse` for a malformed address, or any invocation
/// failure.
pub fn private_address(runner: &dyn ToolRunner) -> Result<NetworkAddress, ToolError> {
    unit_address(runner, "private-address")
}

/// Address reachable from outside the model.
///
/// # Errors
///
/// `UnparsableResponse` for a malformed address, or any invocation
/// failure.
pub fn public_address(runner: &dyn ToolRunner) -> Result<NetworkAddress, ToolError> {
    unit_address(runner, "public-address")
}

/// Availability zone of the unit's machine, when the provider reports one.
#[must_use]
pub fn availability_zone(env: &dyn HookEnv) -> Option<String> {
    env::optional(env, vars::JUJU_AVAILABILITY_ZONE)
}

/// Transport protocol of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
        }
    }
}

/// A port or port range, rendered `80/tcp`, `8000-8010/udp`, or `icmp`.
///
/// The constructors are `const` and do not check their input; port 0 and
/// reversed ranges are caught by [`Port::is_valid`], which both parsing
/// and [`open_port`]/[`close_port`] apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port {
    pub from: u16,
    pub to: u16,
    pub protocol: Protocol,
}

impl Port {
    #[must_use]
    pub const fn tcp(port: u16) -> Self {
        Self::range(port, port, Protocol::Tcp)
    }

    #[must_use]
    pub const fn udp(port: u16) -> Self {
        Self::range(port, port, Protocol::Udp)
    }

    #[must_use]
    pub const fn icmp() -> Self {
        Self::range(0, 0, Protocol::Icmp)
    }

    #[must_use]
    pub const fn range(from: u16, to: u16, protocol: Protocol) -> Self {
        Self { from, to, protocol }
    }

    /// `icmp`, or a non-zero `from` no greater than `to`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.protocol, Protocol::Icmp) || (self.from != 0 && self.from <= self.to)
    }

    fn checked(self, tool: &str) -> Result<Self, ToolError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ToolError::invalid_argument(
                tool,
                format!("port range {}-{} is empty or starts at 0", self.from, self.to),
            ))
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            Protocol::Icmp => f.write_str("icmp"),
            p if self.from == self.to => write!(f, "{}/{}", self.from, p.as_str()),
            p => write!(f, "{}-{}/{}", self.from, self.to, p.as_str()),
        }
    }
}

impl FromStr for Port {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "icmp" {
            return Ok(Self::icmp());
        }
        let bad = || format!("malformed port '{s}'");
        let (numbers, protocol) = s.split_once('/').ok_or_else(bad)?;
        let protocol = match protocol {
            "tcp" => Protocol::Tcp,
            "udp" => Protocol::Udp,
            _ => return Err(bad()),
        };
        let (from, to) = match numbers.split_once('-') {
            Some((from, to)) => (from, to),
            None => (numbers, numbers),
        };
        let from: u16 = from.parse().map_err(|_| bad())?;
        let to: u16 = to.parse().map_err(|_| bad())?;
        let port = Self::range(from, to, protocol);
        if !port.is_valid() {
            return Err(bad());
        }
        Ok(port)
    }
}

/// Opens a port on the unit's machine.
///
/// # Errors
///
/// `InvalidArgument` for port 0 or a reversed range, or any invocation
/// failure.
pub fn open_port(runner: &dyn ToolRunner, port: Port) -> Result<(), ToolError> {
    let port = port.checked(OPEN_PORT)?;
    run(runner, &Invocation::new(OPEN_PORT).arg(port.to_string()))?;
    Ok(())
}

/// Closes a previously opened port.
///
/// # Errors
///
/// `InvalidArgument` for port 0 or a reversed range, or any invocation
/// failure.
pub fn close_port(runner: &dyn ToolRunner, port: Port) -> Result<(), ToolError> {
    let port = port.checked(CLOSE_PORT)?;
    run(runner, &Invocation::new(CLOSE_PORT).arg(port.to_string()))?;
    Ok(())
}

/// Ports this unit has opened.
///
/// # Errors
///
/// `UnparsableResponse` for a malformed entry, or any invocation failure.
pub fn opened_ports(runner: &dyn ToolRunner) -> Result<Vec<Port>, ToolError> {
    let out = run(runner, &Invocation::new(OPENED_PORTS))?;
    parse::list_of(OPENED_PORTS, &out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRunner, MapEnv};

    #[test]
    fn private_address_ip() {
        let runner = FakeRunner::new().with_stdout(["unit-get", "private-address"], "10.1.2.3\n");
        let addr = private_address(&runner).unwrap();
        assert_eq!(addr.ip(), Some("10.1.2.3".parse().unwrap()));
    }

    #[test]
    fn public_address_hostname() {
        let runner = FakeRunner::new().with_stdout(
            ["unit-get", "public-address"],
            "ec2-1-2-3-4.compute.amazonaws.com\n",
        );
        let addr = public_address(&runner).unwrap();
        assert_eq!(
            addr,
            NetworkAddress::Hostname("ec2-1-2-3-4.compute.amazonaws.com".into())
        );
    }

    #[test]
    fn garbage_address_is_unparsable() {
        let runner = FakeRunner::new().with_stdout(["unit-get", "private-address"], "not an address");
        assert!(matches!(
            private_address(&runner).unwrap_err(),
            ToolError::UnparsableResponse { .. }
        ));
    }

    #[test]
    fn port_rendering() {
        assert_eq!(Port::tcp(80).to_string(), "80/tcp");
        assert_eq!(Port::range(8000, 8010, Protocol::Udp).to_string(), "8000-8010/udp");
        assert_eq!(Port::icmp().to_string(), "icmp");
    }

    #[test]
    fn port_parsing_rejects_bad_input() {
        assert!("80".parse::<Port>().is_err());
        assert!("80/sctp".parse::<Port>().is_err());
        assert!("90-80/tcp".parse::<Port>().is_err());
        assert!("0/tcp".parse::<Port>().is_err());
    }

    #[test]
    fn unchecked_ports_rejected_before_invocation() {
        let runner = FakeRunner::new();
        assert!(!Port::tcp(0).is_valid());
        assert!(!Port::range(90, 80, Protocol::Udp).is_valid());
        assert!(Port::icmp().is_valid());

        let err = open_port(&runner, Port::tcp(0)).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref tool, .. } if tool == "open-port"));
        let err = close_port(&runner, Port::range(90, 80, Protocol::Udp)).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref tool, .. } if tool == "close-port"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn open_and_list_ports() {
        let runner = FakeRunner::new()
            .with_ok(["open-port", "443/tcp"])
            .with_stdout(["opened-ports"], "443/tcp\n8000-8010/udp\nicmp\n");
        open_port(&runner, Port::tcp(443)).unwrap();
        assert_eq!(
            opened_ports(&runner).unwrap(),
            vec![
                Port::tcp(443),
                Port::range(8000, 8010, Protocol::Udp),
                Port::icmp()
            ]
        );
    }

    #[test]
    fn close_port_failure_propagates() {
        let runner = FakeRunner::new().respond(
            ["close-port", "53/udp"],
            crate::RawOutput::failure(1, "port not open"),
        );
        assert_eq!(close_port(&runner, Port::udp(53)).unwrap_err().exit_code(), Some(1));
    }

    #[test]
    fn availability_zone_optional() {
        let env = MapEnv::new().with_var(vars::JUJU_AVAILABILITY_ZONE, "us-east-1a");
        assert_eq!(availability_zone(&env).as_deref(), Some("us-east-1a"));
        assert_eq!(availability_zone(&MapEnv::new()), None);
    }
}
