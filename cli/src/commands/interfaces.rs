use colored::*;
use netatlas_core::interfaces::{self, Interface, InterfaceKind};

pub fn run() -> anyhow::Result<()> {
    let interfaces = interfaces::list_interfaces();
    if interfaces.is_empty() {
        println!("no network interfaces found");
        return Ok(());
    }
    for interface in &interfaces {
        print_interface(interface);
    }
    Ok(())
}

fn print_interface(interface: &Interface) {
    let state = if interface.is_up {
        "up".green()
    } else {
        "down".red()
    };
    println!(
        "{} {} ({}, {state})",
        format!("#{}", interface.index).dimmed(),
        interface.name.bold(),
        kind_label(interface.kind),
    );
    if let Some(mac) = &interface.hardware_address {
        println!("    mac      {mac}");
    }
    for addr in &interface.ipv4 {
        println!("    inet     {addr}");
    }
    for addr in &interface.ipv6 {
        println!("    inet6    {addr}");
    }
    if let Some(gateway) = &interface.gateway {
        println!("    gateway  {gateway}");
    }
}

fn kind_label(kind: InterfaceKind) -> &'static str {
    match kind {
        InterfaceKind::Wifi => "wifi",
        InterfaceKind::Cellular => "cellular",
        InterfaceKind::WiredEthernet => "ethernet",
        InterfaceKind::Bridge => "bridge",
        InterfaceKind::Loopback => "loopback",
        InterfaceKind::Other => "other",
    }
}
