#![cfg(test)]
use netatlas_common::network::endpoint::{Endpoint, Host};
use netatlas_common::network::range::IpAddressRange;
use netatlas_core::resolver::{BatchResolver, Resolver};

fn endpoint(text: &str) -> Endpoint {
    text.parse().expect("endpoint should parse")
}

/// A batch of already-resolved endpoints takes the fast path end to end:
/// same values back, same order, `None` holes untouched.
#[tokio::test]
async fn pre_resolved_batch_passes_through() {
    let resolver = BatchResolver::new();
    let entries = vec![
        Some(endpoint("192.0.2.1:443")),
        None,
        Some(endpoint("[2001:db8::1]:443")),
    ];

    let results = resolver.resolve_batch(entries).await.expect("batch should not fault");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Some(Ok(endpoint("192.0.2.1:443"))));
    assert_eq!(results[1], None);
    assert_eq!(results[2], Some(Ok(endpoint("[2001:db8::1]:443"))));
}

/// `localhost` resolves through the real system resolver (hosts file); the
/// result must be a loopback address on the original port.
#[tokio::test]
async fn resolves_localhost_through_the_system() {
    let resolver = BatchResolver::new();
    let results = resolver
        .resolve_batch(vec![Some(endpoint("localhost:8080"))])
        .await
        .expect("batch should not fault");

    let resolved = results[0]
        .clone()
        .expect("entry should be present")
        .expect("localhost should resolve");
    assert_eq!(resolved.port(), 8080);
    let address = resolved.host().address().expect("host should be an address");
    assert!(address.is_loopback(), "got {address}");
}

/// Hosts enumerated from a CIDR range feed straight into a batch, and every
/// resolved entry still belongs to the range.
#[tokio::test]
async fn range_hosts_flow_into_a_batch() {
    let range: IpAddressRange = "192.168.50.0/29".parse().unwrap();
    let entries: Vec<Option<Endpoint>> = range
        .hosts(0..)
        .into_iter()
        .map(|addr| {
            let host = match std::net::IpAddr::from(addr) {
                std::net::IpAddr::V4(v4) => Host::V4(v4),
                std::net::IpAddr::V6(v6) => Host::V6(v6),
            };
            Some(Endpoint::new(host, 22))
        })
        .collect();
    assert_eq!(entries.len(), 6);

    let results = BatchResolver::new()
        .resolve_batch(entries)
        .await
        .expect("batch should not fault");

    for outcome in results {
        let resolved = outcome.expect("no holes in this batch").expect("pre-resolved");
        let address = resolved.host().address().expect("host is an address");
        assert!(range.contains(&address), "{address} escaped {range}");
    }
}
