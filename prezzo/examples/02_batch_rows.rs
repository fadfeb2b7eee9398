mod common;

use common::get_connectors;
use prezzo::{CalendarStamp, DateInput, Prezzo, PriceQuery, Target};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut builder = Prezzo::builder();
    for connector in get_connectors() {
        builder = builder.with_connector(connector);
    }
    let prezzo = builder.build()?;

    // A small batch; each row resolves independently and a missing price is
    // a per-row outcome, not a batch failure.
    let rows = [
        ("btc", "2025-12-09 22:46:02", "CST", Target::High),
        ("xmr", "2025-12-09 22:46:02", "CST", Target::Low),
        ("nosuchtoken", "2025-11-01 09:00:00", "UTC", Target::High),
    ];

    let mut queries = Vec::new();
    for (token, stamp, zone, target) in rows {
        queries.push(PriceQuery::new(
            token,
            DateInput::Components(CalendarStamp::parse(stamp)?),
            zone,
            target,
        )?);
    }

    for (query, outcome) in queries.iter().zip(prezzo.resolve_many(&queries).await) {
        match outcome {
            Ok(price) => println!("{} {}: {price} USD", query.token, query.target.as_str()),
            Err(e) => println!("{} {}: {e}", query.token, query.target.as_str()),
        }
    }

    Ok(())
}
