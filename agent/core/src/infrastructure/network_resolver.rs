// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Route-table Default Network Resolver (Linux)
//!
//! Finds the default route in `/proc/net/route`, then asks `ip -j` for the
//! IPv4 address of that route's interface. The result only carries IP,
//! netmask and gateway; callers merge it into the network they resolve.

use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use crate::domain::settings::Network;
use crate::domain::source::{DefaultNetworkResolver, ResolutionError};

pub struct RouteTableNetworkResolver {
    route_table_path: PathBuf,
    ip_command: String,
}

impl Default for RouteTableNetworkResolver {
    fn default() -> Self {
        Self {
            route_table_path: PathBuf::from("/proc/net/route"),
            ip_command: "ip".to_string(),
        }
    }
}

impl RouteTableNetworkResolver {
    pub fn new(route_table_path: impl Into<PathBuf>, ip_command: impl Into<String>) -> Self {
        Self {
            route_table_path: route_table_path.into(),
            ip_command: ip_command.into(),
        }
    }

    fn interface_address(&self, interface: &str) -> Result<(Ipv4Addr, u8), ResolutionError> {
        let args = ["-j", "-4", "addr", "show", "dev", interface];
        let command = format!("{} {}", self.ip_command, args.join(" "));

        let output = Command::new(&self.ip_command)
            .args(args)
            .output()
            .map_err(|e| ResolutionError::Command {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ResolutionError::Command {
                command,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_interface_address(&output.stdout)
    }
}

impl DefaultNetworkResolver for RouteTableNetworkResolver {
    fn get_default_network(&self) -> Result<Network, ResolutionError> {
        let routes = std::fs::read_to_string(&self.route_table_path)
            .map_err(ResolutionError::RouteTable)?;
        let route = parse_default_route(&routes)?;
        debug!(
            "Default route via {} on interface {}",
            route.gateway, route.interface
        );

        let (ip, prefix) = self.interface_address(&route.interface)?;

        Ok(Network {
            ip: ip.to_string(),
            netmask: prefix_to_netmask(prefix).to_string(),
            gateway: route.gateway.to_string(),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRoute {
    pub interface: String,
    pub gateway: Ipv4Addr,
}

/// Find the default route (destination and mask 0.0.0.0) in the contents of
/// `/proc/net/route`. Addresses in that file are hex in host byte order.
pub fn parse_default_route(contents: &str) -> Result<DefaultRoute, ResolutionError> {
    for line in contents.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            continue;
        }
        let (interface, destination, gateway, mask) = (fields[0], fields[1], fields[2], fields[7]);
        if destination != "00000000" || mask != "00000000" {
            continue;
        }

        let raw = u32::from_str_radix(gateway, 16)
            .map_err(|e| ResolutionError::Parse(format!("gateway '{}': {}", gateway, e)))?;
        return Ok(DefaultRoute {
            interface: interface.to_string(),
            gateway: Ipv4Addr::from(raw.to_le_bytes()),
        });
    }
    Err(ResolutionError::NoDefaultRoute)
}

#[derive(Debug, Deserialize)]
struct IpLink {
    #[serde(default)]
    addr_info: Vec<IpAddrInfo>,
}

#[derive(Debug, Deserialize)]
struct IpAddrInfo {
    family: String,
    local: String,
    prefixlen: u8,
}

/// First IPv4 address and prefix length from `ip -j addr show` output
pub fn parse_interface_address(json: &[u8]) -> Result<(Ipv4Addr, u8), ResolutionError> {
    let links: Vec<IpLink> =
        serde_json::from_slice(json).map_err(|e| ResolutionError::Parse(e.to_string()))?;

    let info = links
        .iter()
        .flat_map(|link| link.addr_info.iter())
        .find(|info| info.family == "inet")
        .ok_or_else(|| ResolutionError::Parse("interface has no IPv4 address".to_string()))?;

    if info.prefixlen > 32 {
        return Err(ResolutionError::Parse(format!(
            "prefix length {} out of range",
            info.prefixlen
        )));
    }

    let ip = info
        .local
        .parse::<Ipv4Addr>()
        .map_err(|e| ResolutionError::Parse(format!("address '{}': {}", info.local, e)))?;
    Ok((ip, info.prefixlen))
}

pub fn prefix_to_netmask(prefix: u8) -> Ipv4Addr {
    let bits = match prefix {
        0 => 0,
        p if p >= 32 => u32::MAX,
        p => u32::MAX << (32 - u32::from(p)),
    };
    Ipv4Addr::from(bits)
}
