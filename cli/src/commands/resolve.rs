use colored::*;
use netatlas_common::network::endpoint::Endpoint;
use netatlas_core::resolver::{BatchResolver, Resolver};

pub async fn run(endpoints: Vec<Endpoint>) -> anyhow::Result<()> {
    let entries: Vec<Option<Endpoint>> = endpoints.into_iter().map(Some).collect();
    let results = BatchResolver::new().resolve_batch(entries).await?;

    for outcome in results.into_iter().flatten() {
        match outcome {
            Ok(endpoint) => println!("{} {endpoint}", "[+]".green().bold()),
            Err(err) => println!("{} {err}", "[-]".red().bold()),
        }
    }
    Ok(())
}
