#![forbid(unsafe_code)]

//! Built-in network list.

use crate::network::{NativeCurrency, NetworkConfig};

struct Preset {
    chain_id: i64,
    name: &'static str,
    rpc_urls: &'static [&'static str],
    currency: (&'static str, &'static str),
    explorers: &'static [&'static str],
}

const PRESETS: &[Preset] = &[
    Preset {
        chain_id: 1,
        name: "Ethereum Mainnet",
        rpc_urls: &["https://eth.llamarpc.com", "https://rpc.ankr.com/eth", "https://cloudflare-eth.com"],
        currency: ("Ether", "ETH"),
        explorers: &["https://etherscan.io", "https://www.oklink.com/eth"],
    },
    Preset {
        chain_id: 5,
        name: "Goerli Testnet",
        rpc_urls: &[
            "https://rpc.ankr.com/eth_goerli",
            "https://goerli.infura.io/v3/9aa3d95b3bc440fa88ea12eaa4456161",
        ],
        currency: ("Goerli Ether", "ETH"),
        explorers: &["https://goerli.etherscan.io"],
    },
    Preset {
        chain_id: 11_155_111,
        name: "Sepolia Testnet",
        rpc_urls: &["https://rpc.sepolia.org", "https://rpc2.sepolia.org", "https://rpc.ankr.com/eth_sepolia"],
        currency: ("Sepolia Ether", "ETH"),
        explorers: &["https://sepolia.etherscan.io"],
    },
    Preset {
        chain_id: 137,
        name: "Polygon",
        rpc_urls: &[
            "https://polygon-rpc.com",
            "https://rpc.ankr.com/polygon",
            "https://polygon-mainnet.public.blastapi.io",
        ],
        currency: ("MATIC", "MATIC"),
        explorers: &["https://polygonscan.com", "https://www.oklink.com/polygon"],
    },
    Preset {
        chain_id: 80_001,
        name: "Polygon Mumbai",
        rpc_urls: &["https://rpc-mumbai.maticvigil.com", "https://rpc.ankr.com/polygon_mumbai"],
        currency: ("MATIC", "MATIC"),
        explorers: &["https://mumbai.polygonscan.com"],
    },
    Preset {
        chain_id: 56,
        name: "BNB Smart Chain",
        rpc_urls: &[
            "https://bsc-dataseed.binance.org",
            "https://bsc-dataseed1.binance.org",
            "https://bsc-dataseed2.binance.org",
            "https://rpc.ankr.com/bsc",
        ],
        currency: ("BNB", "BNB"),
        explorers: &["https://bscscan.com", "https://www.oklink.com/bsc"],
    },
    Preset {
        chain_id: 97,
        name: "BNB Smart Chain Testnet",
        rpc_urls: &[
            "https://data-seed-prebsc-1-s1.binance.org:8545",
            "https://data-seed-prebsc-2-s1.binance.org:8545",
        ],
        currency: ("tBNB", "tBNB"),
        explorers: &["https://testnet.bscscan.com"],
    },
    Preset {
        chain_id: 42_161,
        name: "Arbitrum One",
        rpc_urls: &["https://arb1.arbitrum.io/rpc", "https://rpc.ankr.com/arbitrum"],
        currency: ("Ether", "ETH"),
        explorers: &["https://arbiscan.io", "https://www.oklink.com/arbitrum"],
    },
    Preset {
        chain_id: 421_613,
        name: "Arbitrum Goerli",
        rpc_urls: &["https://goerli-rollup.arbitrum.io/rpc"],
        currency: ("Arbitrum Goerli Ether", "ETH"),
        explorers: &["https://goerli.arbiscan.io"],
    },
    Preset {
        chain_id: 10,
        name: "Optimism",
        rpc_urls: &["https://mainnet.optimism.io", "https://rpc.ankr.com/optimism"],
        currency: ("Ether", "ETH"),
        explorers: &["https://optimistic.etherscan.io", "https://www.oklink.com/optimism"],
    },
    Preset {
        chain_id: 420,
        name: "Optimism Goerli",
        rpc_urls: &["https://goerli.optimism.io"],
        currency: ("Goerli Ether", "ETH"),
        explorers: &["https://goerli-optimism.etherscan.io"],
    },
    Preset {
        chain_id: 43_114,
        name: "Avalanche C-Chain",
        rpc_urls: &["https://api.avax.network/ext/bc/C/rpc", "https://rpc.ankr.com/avalanche"],
        currency: ("Avalanche", "AVAX"),
        explorers: &["https://snowtrace.io", "https://www.oklink.com/avalanche"],
    },
    Preset {
        chain_id: 43_113,
        name: "Avalanche Fuji Testnet",
        rpc_urls: &["https://api.avax-test.network/ext/bc/C/rpc", "https://rpc.ankr.com/avalanche_fuji"],
        currency: ("Avalanche", "AVAX"),
        explorers: &["https://testnet.snowtrace.io"],
    },
    Preset {
        chain_id: 250,
        name: "Fantom Opera",
        rpc_urls: &["https://rpc.ftm.tools", "https://rpc.ankr.com/fantom"],
        currency: ("Fantom", "FTM"),
        explorers: &["https://ftmscan.com", "https://www.oklink.com/fantom"],
    },
    Preset {
        chain_id: 4002,
        name: "Fantom Testnet",
        rpc_urls: &["https://rpc.testnet.fantom.network"],
        currency: ("Fantom", "FTM"),
        explorers: &["https://testnet.ftmscan.com"],
    },
    Preset {
        chain_id: 8453,
        name: "Base",
        rpc_urls: &["https://mainnet.base.org", "https://base.publicnode.com"],
        currency: ("Ether", "ETH"),
        explorers: &["https://basescan.org", "https://www.oklink.com/base"],
    },
    Preset {
        chain_id: 84_531,
        name: "Base Goerli",
        rpc_urls: &["https://goerli.base.org"],
        currency: ("Ether", "ETH"),
        explorers: &["https://goerli.basescan.org"],
    },
];

fn build(p: &Preset) -> NetworkConfig {
    let rpc_urls: Vec<String> = p.rpc_urls.iter().map(|s| (*s).to_string()).collect();
    let block_explorers: Vec<String> = p.explorers.iter().map(|s| (*s).to_string()).collect();
    NetworkConfig {
        chain_id: p.chain_id,
        name: p.name.to_string(),
        default_rpc_url: rpc_urls.first().cloned().unwrap_or_default(),
        rpc_urls,
        native_currency: NativeCurrency {
            name: p.currency.0.to_string(),
            symbol: p.currency.1.to_string(),
            decimals: 18,
        },
        default_block_explorer: block_explorers.first().cloned().unwrap_or_default(),
        block_explorers,
    }
}

/// All built-in networks, in display order. The first RPC and explorer of
/// each entry are its defaults.
#[must_use]
pub fn preset_networks() -> Vec<NetworkConfig> {
    PRESETS.iter().map(build).collect()
}

#[must_use]
pub fn preset_network(chain_id: i64) -> Option<NetworkConfig> {
    PRESETS.iter().find(|p| p.chain_id == chain_id).map(build)
}

#[must_use]
pub fn is_preset_network(chain_id: i64) -> bool {
    PRESETS.iter().any(|p| p.chain_id == chain_id)
}
