use serde::Serialize;

/// An EVM network that uses the Ethereum address scheme.
///
/// `slug` is the chain identifier used throughout the wallet. Each network
/// gets its own slug so keys derived for one EVM network never coincide with
/// keys derived for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvmNetwork {
    pub slug: &'static str,
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

pub const ETHEREUM: EvmNetwork = EvmNetwork {
    slug: "ethereum",
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    decimals: 18,
};

pub const POLYGON: EvmNetwork = EvmNetwork {
    slug: "polygon",
    chain_id: 137,
    name: "Polygon",
    symbol: "POL",
    decimals: 18,
};

pub const BSC: EvmNetwork = EvmNetwork {
    slug: "bsc",
    chain_id: 56,
    name: "BNB Smart Chain",
    symbol: "BNB",
    decimals: 18,
};

pub const ARBITRUM: EvmNetwork = EvmNetwork {
    slug: "arbitrum",
    chain_id: 42161,
    name: "Arbitrum One",
    symbol: "ETH",
    decimals: 18,
};

pub const OPTIMISM: EvmNetwork = EvmNetwork {
    slug: "optimism",
    chain_id: 10,
    name: "Optimism",
    symbol: "ETH",
    decimals: 18,
};

pub const BASE: EvmNetwork = EvmNetwork {
    slug: "base",
    chain_id: 8453,
    name: "Base",
    symbol: "ETH",
    decimals: 18,
};

pub const AVALANCHE: EvmNetwork = EvmNetwork {
    slug: "avalanche",
    chain_id: 43114,
    name: "Avalanche C-Chain",
    symbol: "AVAX",
    decimals: 18,
};

const ALL_NETWORKS: &[EvmNetwork] = &[
    ETHEREUM, POLYGON, BSC, ARBITRUM, OPTIMISM, BASE, AVALANCHE,
];

pub fn all() -> &'static [EvmNetwork] {
    ALL_NETWORKS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_and_ids_are_unique() {
        let nets = all();
        for (i, a) in nets.iter().enumerate() {
            for b in &nets[i + 1..] {
                assert_ne!(a.slug, b.slug);
                assert_ne!(a.chain_id, b.chain_id);
            }
        }
    }

    #[test]
    fn all_networks_use_18_decimals() {
        for net in all() {
            assert_eq!(net.decimals, 18, "{} should have 18 decimals", net.name);
        }
    }
}
