//! Runner configuration

use crate::error::{RunnerError, RunnerResult};
use evmb_interpreter::GAS_UNLIMITED;
use evmb_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the mocked host is reused between benchmark iterations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HostPolicy {
    /// Every iteration starts from a copy of the post-deploy host
    #[default]
    Fresh,
    /// All iterations run against one host and see each other's writes
    Shared,
}

/// Runner configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Account that deploys and calls the contract
    #[serde(default = "default_caller")]
    pub caller: Address,
    /// Address the contract is deployed at
    #[serde(default = "default_contract")]
    pub contract: Address,
    /// Gas for deployment and for each run
    #[serde(default = "default_gas_limit")]
    pub gas_limit: i64,
    /// Host reuse between runs
    #[serde(default)]
    pub host_policy: HostPolicy,
    /// Worker threads
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_caller() -> Address {
    Address::from_bytes([
        0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
    ])
}

fn default_contract() -> Address {
    Address::from_bytes([
        0x20, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x02,
    ])
}

fn default_gas_limit() -> i64 {
    GAS_UNLIMITED
}

fn default_jobs() -> usize {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            caller: default_caller(),
            contract: default_contract(),
            gas_limit: default_gas_limit(),
            host_policy: HostPolicy::default(),
            jobs: default_jobs(),
            log_level: default_log_level(),
        }
    }
}

impl RunnerConfig {
    /// Read a TOML config file; missing keys take their defaults
    pub fn load(path: &Path) -> RunnerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RunnerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| RunnerError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject combinations the benchmark cannot run
    pub fn validate(&self) -> RunnerResult<()> {
        if self.gas_limit < 0 {
            return Err(RunnerError::Settings("gas limit must not be negative".into()));
        }
        if self.jobs == 0 {
            return Err(RunnerError::Settings("jobs must be at least 1".into()));
        }
        if self.jobs > 1 && self.host_policy == HostPolicy::Shared {
            return Err(RunnerError::Settings(
                "a shared host cannot be used with more than one job".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = RunnerConfig::default();
        assert_eq!(config.caller.to_hex(), "0x1000000000000000000000000000000000000001");
        assert_eq!(config.contract.to_hex(), "0x2000000000000000000000000000000000000002");
        assert_eq!(config.gas_limit, GAS_UNLIMITED);
        assert_eq!(config.host_policy, HostPolicy::Fresh);
        assert_eq!(config.jobs, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            contract = "0x00000000000000000000000000000000000000aa"
            gas_limit = 1000000
            host_policy = "shared"
            log_level = "debug"
        "#;
        let config: RunnerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.contract, Address::from_low_u64(0xaa));
        assert_eq!(config.gas_limit, 1_000_000);
        assert_eq!(config.host_policy, HostPolicy::Shared);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.caller, default_caller());
        assert_eq!(config.jobs, 1);
    }

    #[test]
    fn test_config_serialize() {
        let toml = toml::to_string(&RunnerConfig::default()).unwrap();
        assert!(toml.contains("host_policy = \"fresh\""));
        assert!(toml.contains("caller"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "jobs = 4").unwrap();
        let config = RunnerConfig::load(file.path()).unwrap();
        assert_eq!(config.jobs, 4);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "jobs = \"many\"").unwrap();
        assert!(matches!(
            RunnerConfig::load(file.path()),
            Err(RunnerError::Config { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_shared_parallel() {
        let config = RunnerConfig {
            jobs: 2,
            host_policy: HostPolicy::Shared,
            ..RunnerConfig::default()
        };
        assert!(matches!(config.validate(), Err(RunnerError::Settings(_))));

        let config = RunnerConfig {
            jobs: 0,
            ..RunnerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
