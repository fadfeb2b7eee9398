use std::sync::Arc;

use prezzo_core::{Candle, PriceConnector};
use prezzo_mock::{MockConnector, Scripted};

#[must_use]
pub fn get_connectors() -> Vec<Arc<dyn PriceConnector>> {
    if std::env::var("PREZZO_EXAMPLES_USE_MOCK").is_ok() {
        println!("--- (Using Mock Connectors for CI) ---");
        let candle = Candle {
            open_time_ms: 1_765_341_960_000,
            open: 189.40,
            high: 191.20,
            low: 189.00,
            close: 190.10,
            volume: 12.5,
        };
        vec![
            Arc::new(MockConnector::named("mock-candles").with_candles(Scripted::Window(vec![candle]))),
            Arc::new(MockConnector::named("mock-tickers").with_ticker(Scripted::Price(190.55))),
        ]
    } else {
        vec![
            Arc::new(prezzo_binance::BinanceConnector::new_default()),
            Arc::new(prezzo_cryptocompare::CryptoCompareConnector::new_default()),
            Arc::new(prezzo_coingecko::CoinGeckoConnector::new_default()),
        ]
    }
}
