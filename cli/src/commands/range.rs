use colored::*;
use netatlas_common::network::range::IpAddressRange;

pub fn run(range: &IpAddressRange, sample: u64) -> anyhow::Result<()> {
    println!("{}", range.to_string().bold());
    println!("  mask       {}", range.subnet_mask());
    println!("  network    {}", range.network_address());
    println!("  broadcast  {}", range.broadcast_address());
    println!("  usable     {}", range.usable_host_count());
    if let (Some(first), Some(last)) = (range.first_usable(), range.last_usable()) {
        println!("  first      {first}");
        println!("  last       {last}");
    }
    if sample > 0 {
        println!("  hosts:");
        for addr in range.hosts(0..sample) {
            println!("    {addr}");
        }
    }
    Ok(())
}
