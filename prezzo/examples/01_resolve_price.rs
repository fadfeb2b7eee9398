mod common;

use common::get_connectors;
use prezzo::{CalendarStamp, DateInput, Prezzo, PriceQuery, Target};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. Register the provider cascade; registration order is fallback order.
    let mut builder = Prezzo::builder();
    for connector in get_connectors() {
        builder = builder.with_connector(connector);
    }
    let prezzo = builder.build()?;

    // 2. A local stamp plus zone abbreviation; the resolver normalizes to UTC.
    let stamp = CalendarStamp::parse("2025-12-09 22:46:02")?;

    for target in [Target::High, Target::Low] {
        let query = PriceQuery::new("xmr", DateInput::Components(stamp), "CST", target)?;
        match prezzo.resolve(&query).await {
            Ok(price) => println!("xmr {}: {price} USD", target.as_str()),
            Err(e) => println!("xmr {}: {e}", target.as_str()),
        }
    }

    Ok(())
}
