pub mod interfaces;
pub mod range;
pub mod resolve;

use clap::{Parser, Subcommand};
use netatlas_common::network::endpoint::Endpoint;
use netatlas_common::network::range::IpAddressRange;

#[derive(Parser)]
#[command(name = "netatlas")]
#[command(about = "Network topology at a glance.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List this device's network interfaces
    #[command(alias = "i")]
    Interfaces,
    /// Inspect a CIDR range (mask, network, broadcast, usable hosts)
    #[command(alias = "r")]
    Range {
        cidr: IpAddressRange,
        /// Also print the first N usable hosts
        #[arg(long, default_value_t = 0)]
        sample: u64,
    },
    /// Resolve one or more endpoints (host:port) in a single batch
    #[command(alias = "d")]
    Resolve {
        #[arg(required = true)]
        endpoints: Vec<Endpoint>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
