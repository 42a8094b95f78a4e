use std::collections::HashMap;

use anyhow::Context as _;

use crate::eth;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown project {0:?}")]
    UnknownProject(String),
    #[error("unknown contract {0:?}")]
    UnknownContract(String),
}

/// Static bidirectional mapping between a project display name and its
/// on-chain contract address. Read-only for the life of a run.
///
/// Contract keys are stored checksum-normalized, so lookups accept any hex
/// casing.
#[derive(Clone, Debug)]
pub struct ProjectRegistry {
    name_to_contract: HashMap<String, String>,
    contract_to_name: HashMap<String, String>,
}

impl ProjectRegistry {
    pub fn from_entries(entries: &HashMap<String, String>) -> anyhow::Result<Self> {
        let mut name_to_contract = HashMap::with_capacity(entries.len());
        let mut contract_to_name = HashMap::with_capacity(entries.len());
        for (name, contract) in entries {
            let checksummed = eth::checksum_address(contract)
                .with_context(|| format!("registry entry {name:?}"))?;
            if let Some(prev) = contract_to_name.insert(checksummed.clone(), name.clone()) {
                anyhow::bail!(
                    "registry contract {checksummed} mapped to both {prev:?} and {name:?}"
                );
            }
            name_to_contract.insert(name.clone(), checksummed);
        }
        Ok(Self {
            name_to_contract,
            contract_to_name,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_contract.is_empty()
    }

    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.name_to_contract.keys().map(String::as_str)
    }

    /// Checksummed contract address for a project display name.
    pub fn contract_for_project(&self, name: &str) -> Result<&str, RegistryError> {
        self.name_to_contract
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RegistryError::UnknownProject(name.to_string()))
    }

    /// Project display name for a contract address (any hex casing).
    pub fn name_from_contract(&self, contract: &str) -> Result<&str, RegistryError> {
        let key = eth::checksum_address(contract)
            .map_err(|_| RegistryError::UnknownContract(contract.to_string()))?;
        self.contract_to_name
            .get(&key)
            .map(String::as_str)
            .ok_or_else(|| RegistryError::UnknownContract(contract.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProjectRegistry {
        let mut entries = HashMap::new();
        entries.insert(
            "CryptoPunks".to_string(),
            "0xb47e3cd837ddf8e4c57f05d70ab865de6e193bbb".to_string(),
        );
        ProjectRegistry::from_entries(&entries).unwrap()
    }

    #[test]
    fn lookup_accepts_lowercase_hex() {
        let r = registry();
        assert_eq!(
            r.name_from_contract("0xb47e3cd837ddf8e4c57f05d70ab865de6e193bbb")
                .unwrap(),
            "CryptoPunks"
        );
    }

    #[test]
    fn unknown_keys_fail() {
        let r = registry();
        assert!(r.contract_for_project("Doodles").is_err());
        assert!(r
            .name_from_contract("0x0000000000000000000000000000000000000001")
            .is_err());
        assert!(r.name_from_contract("not-hex").is_err());
    }
}
