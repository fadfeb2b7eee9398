//! Static symbol → coin-id map for the majors, saving a search round trip.

const IDS: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("usdt", "tether"),
    ("usdc", "usd-coin"),
    ("bnb", "binancecoin"),
    ("xrp", "ripple"),
    ("sol", "solana"),
    ("ada", "cardano"),
    ("doge", "dogecoin"),
    ("trx", "tron"),
    ("dot", "polkadot"),
    ("matic", "matic-network"),
    ("ltc", "litecoin"),
    ("avax", "avalanche-2"),
    ("atom", "cosmos"),
    ("link", "chainlink"),
    ("xlm", "stellar"),
    ("xmr", "monero"),
    ("etc", "ethereum-classic"),
    ("bch", "bitcoin-cash"),
    ("zec", "zcash"),
    ("dash", "dash"),
];

pub(crate) fn lookup(symbol: &str) -> Option<&'static str> {
    IDS.iter().find(|(s, _)| *s == symbol).map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majors_resolve_without_search() {
        assert_eq!(lookup("xmr"), Some("monero"));
        assert_eq!(lookup("btc"), Some("bitcoin"));
        assert_eq!(lookup("definitely-not-a-coin"), None);
    }
}
