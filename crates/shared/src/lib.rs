/// Static program configuration
pub struct Config {
    pub name: &'static str,
    pub tagline: &'static str,

    // Contract addresses come from the host page (window.APP_CONFIG); only the
    // values the page cannot override live here
    pub network: Network,
    pub token: Token,
}

/// Target chain every write action must run on
pub struct Network {
    pub chain_id: u64,
    pub name: &'static str,
}

/// Payment and reward token metadata
pub struct Token {
    pub symbol: &'static str,
    pub reward_symbol: &'static str,
    pub decimals: u8,
}

pub static CONFIG: Config = Config {
    name: "365df",
    tagline: "Binary referral program",

    network: Network {
        chain_id: 56,
        name: "BSC Mainnet",
    },

    token: Token {
        symbol: "USDT",
        reward_symbol: "DF",
        decimals: 18,
    },
};
