//! SDK configuration loaded from a TOML file.

use {
    alloy_primitives::Address,
    anyhow::{Context, Result},
    bigdecimal::BigDecimal,
    contracts::{BalancerGovernanceToken, BalancerV2Vault, WETH9},
    serde::Deserialize,
    serde_with::{DisplayFromStr, serde_as},
    std::{path::Path, str::FromStr, time::Duration},
    url::Url,
};

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Chain ID of the network the pools live on.
    pub network: u64,

    /// Balancer V2 subgraph to fetch pools from.
    pub subgraph_url: Url,

    /// Overrides the Vault deployment of the network.
    pub vault: Option<Address>,

    /// Overrides the wrapped native asset of the network.
    pub wrapped_native_asset: Option<Address>,

    /// Overrides the BAL token of the network.
    pub bal_token: Option<Address>,

    /// Share of swap fees and yields kept by the protocol.
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_protocol_swap_fee")]
    pub protocol_swap_fee: BigDecimal,

    /// Timeout of requests to the data providers.
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,

    #[serde(default)]
    pub logging: observe::Config,
}

fn default_protocol_swap_fee() -> BigDecimal {
    BigDecimal::new(5.into(), 1)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Config {
    pub fn vault(&self) -> Result<Address> {
        self.vault
            .or_else(|| BalancerV2Vault::deployment_address(self.network))
            .with_context(|| format!("no Vault deployment for chain {}", self.network))
    }

    pub fn wrapped_native_asset(&self) -> Result<Address> {
        self.wrapped_native_asset
            .or_else(|| WETH9::deployment_address(self.network))
            .with_context(|| format!("no wrapped native asset for chain {}", self.network))
    }

    /// The BAL token, if Balancer governance is deployed on the network.
    pub fn bal_token(&self) -> Option<Address> {
        self.bal_token
            .or_else(|| BalancerGovernanceToken::deployment_address(self.network))
    }

    /// An HTTP client honouring the configured request timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("failed to build HTTP client")
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid SDK configuration")
    }
}

/// Reads the configuration at `path`. Unknown keys are errors.
pub fn load(path: &Path) -> Result<Config> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    data.parse()
        .with_context(|| format!("TOML error while reading {path:?}"))
}

#[cfg(test)]
mod tests {
    use {super::*, alloy_primitives::address, std::io::Write};

    #[test]
    fn minimal_config_uses_network_defaults() {
        let config: Config = r#"
            network = 100
            subgraph-url = "https://api.studio.thegraph.com/query/75376/balancer-gnosis-chain-v2/latest"
        "#
        .parse()
        .unwrap();

        assert_eq!(
            config.vault().unwrap(),
            address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8")
        );
        assert_eq!(
            config.wrapped_native_asset().unwrap(),
            address!("0xe91D153E0b41518A2Ce8Dd3D7944Fa863463a97d")
        );
        assert_eq!(
            config.bal_token(),
            Some(address!("0x7eF541E2a22058048904fE5744f9c7E4C57AF717"))
        );
        assert_eq!(config.protocol_swap_fee, BigDecimal::from_str("0.5").unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.logging, observe::Config::default());
    }

    #[test]
    fn full_config() {
        let config: Config = r#"
            network = 31337
            subgraph-url = "http://localhost:8000/subgraphs/name/balancer"
            vault = "0x1111111111111111111111111111111111111111"
            wrapped-native-asset = "0x2222222222222222222222222222222222222222"
            bal-token = "0x3333333333333333333333333333333333333333"
            protocol-swap-fee = "0.25"
            request-timeout = "5s"

            [logging]
            env-filter = "sdk=debug"
            use-json-format = true
        "#
        .parse()
        .unwrap();

        assert_eq!(config.vault().unwrap(), Address::repeat_byte(0x11));
        assert_eq!(
            config.wrapped_native_asset().unwrap(),
            Address::repeat_byte(0x22)
        );
        assert_eq!(config.bal_token(), Some(Address::repeat_byte(0x33)));
        assert_eq!(config.protocol_swap_fee, BigDecimal::from_str("0.25").unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(
            config.logging,
            observe::Config::default()
                .with_env_filter("sdk=debug")
                .with_json_format()
        );
    }

    #[test]
    fn unknown_network_needs_overrides() {
        let config: Config = r#"
            network = 31337
            subgraph-url = "http://localhost:8000/subgraphs/name/balancer"
        "#
        .parse()
        .unwrap();
        assert!(config.vault().is_err());
        assert!(config.wrapped_native_asset().is_err());
        assert_eq!(config.bal_token(), None);
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = r#"
            network = 1
            subgraph-url = "http://localhost:8000/subgraphs/name/balancer"
            sor-enabled = true
        "#
        .parse::<Config>();
        assert!(result.is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "network = 1\nsubgraph-url = \"http://localhost:8000/subgraphs/name/balancer\""
        )
        .unwrap();
        assert_eq!(load(file.path()).unwrap().network, 1);
        assert!(load(Path::new("/definitely/not/here.toml")).is_err());
    }
}
