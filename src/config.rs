use std::{env::VarError, str::FromStr};

use argon2::Params;

use crate::{
    errors::ServerError,
    store::{
        credential::CredentialGuard,
        identity::{IdGenerator, ID_ALPHABET, ID_LENGTH},
    },
};

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    /// Notes are kept in memory when this is unset.
    pub database_url: Option<String>,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub id_length: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ServerError> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(url),
            Ok(_) | Err(VarError::NotPresent) => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Config {
            bind_address: var_or("BIND_ADDRESS", "0.0.0.0".to_string())?,
            port: var_or("PORT", 8080)?,
            database_url,
            hash_memory_kib: var_or("HASH_MEMORY_KIB", Params::DEFAULT_M_COST)?,
            hash_iterations: var_or("HASH_ITERATIONS", Params::DEFAULT_T_COST)?,
            id_length: var_or("ID_LENGTH", ID_LENGTH)?,
        })
    }

    pub fn credential_guard(&self) -> Result<CredentialGuard, ServerError> {
        let params = Params::new(
            self.hash_memory_kib,
            self.hash_iterations,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| ServerError::EnvironmentError(format!("invalid hashing cost: {e}")))?;
        Ok(CredentialGuard::new(params))
    }

    pub fn id_generator(&self) -> Result<IdGenerator, ServerError> {
        if self.id_length < 6 {
            return Err(ServerError::EnvironmentError(
                "ID_LENGTH must be at least 6".to_string(),
            ));
        }
        Ok(IdGenerator::new(&ID_ALPHABET, self.id_length))
    }
}

fn var_or<T: FromStr>(key: &str, default: T) -> Result<T, ServerError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ServerError::EnvironmentError(format!("{key} has an invalid value"))),
        Err(VarError::NotPresent) => Ok(default),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_falls_back_to_default() {
        assert_eq!(var_or("NOTEDROP_TEST_UNSET_PORT", 8080u16).unwrap(), 8080);
    }

    #[test]
    fn set_variable_is_parsed() {
        std::env::set_var("NOTEDROP_TEST_ITERATIONS", " 3 ");
        assert_eq!(var_or("NOTEDROP_TEST_ITERATIONS", 2u32).unwrap(), 3);
    }

    #[test]
    fn unparsable_variable_is_an_error() {
        std::env::set_var("NOTEDROP_TEST_BAD_PORT", "eighty");
        assert!(matches!(
            var_or("NOTEDROP_TEST_BAD_PORT", 8080u16),
            Err(ServerError::EnvironmentError(_))
        ));
    }

    #[test]
    fn rejected_hashing_cost_is_reported() {
        let config = Config {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            database_url: None,
            hash_memory_kib: 1,
            hash_iterations: 0,
            id_length: 3,
        };
        assert!(matches!(
            config.credential_guard(),
            Err(ServerError::EnvironmentError(_))
        ));
        assert!(matches!(
            config.id_generator(),
            Err(ServerError::EnvironmentError(_))
        ));
    }
}
