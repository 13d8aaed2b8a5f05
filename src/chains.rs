use std::{collections::HashMap, fmt};

/// Etherscan v2 unified endpoint, the network is selected with `chainid`.
pub const EXPLORER_API_URL: &str = "https://api.etherscan.io/v2/api";

/// Linea canonical bridge on Ethereum mainnet.
pub const LINEA_BRIDGE_CONTRACT: &str = "0xd19d4B5d358258f05D7B411E21A1460D11B0876F";

/// keccak256("MessageSent(address,address,uint256,uint256,uint256,bytes,bytes32)")
pub const MESSAGE_SENT_TOPIC: &str =
    "0xe856c2b8bd4eb0027ce32eeaf595c21b0b6b4644b326e5b7bd80a1cf8db72e6c";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chain {
    pub id: i64,
    pub name: &'static str,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub static ETHEREUM: Chain = Chain {
    id: 1,
    name: "ethereum",
};

pub static LINEA: Chain = Chain {
    id: 59144,
    name: "linea",
};

pub static AVAILABLE_CHAINS: [Chain; 2] = [ETHEREUM, LINEA];

pub fn get_chains() -> HashMap<String, Chain> {
    let mut chains: HashMap<String, Chain> = HashMap::new();

    for chain in AVAILABLE_CHAINS.into_iter() {
        chains.insert(String::from(chain.name), chain);
    }

    chains
}

pub fn get_chain(name: &str) -> Option<Chain> {
    let name = name.to_lowercase();

    let name = if name == "mainnet" { "ethereum".to_string() } else { name };

    get_chains().get(&name).copied()
}
