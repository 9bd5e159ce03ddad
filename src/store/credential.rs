use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use derive_more::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[display(fmt = "password hashing failed")]
    CryptoFailure,
    #[display(fmt = "stored credential is not a valid password hash")]
    MalformedCredential,
}

impl std::error::Error for CredentialError {}

/// Turns note passwords into salted Argon2id hashes (PHC strings) and checks
/// attempts against them. Default cost is m=19456 KiB, t=2, p=1
/// (`Params::DEFAULT`). The configured cost only applies to new hashes,
/// verification reads the cost back from the stored hash.
#[derive(Clone)]
pub struct CredentialGuard {
    argon2: Argon2<'static>,
    #[cfg(test)]
    broken: bool,
}

impl Default for CredentialGuard {
    fn default() -> Self {
        CredentialGuard::new(Params::default())
    }
}

impl CredentialGuard {
    pub fn new(params: Params) -> Self {
        CredentialGuard {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            #[cfg(test)]
            broken: false,
        }
    }

    pub fn hash(&self, plaintext: &str) -> Result<Vec<u8>, CredentialError> {
        #[cfg(test)]
        if self.broken {
            return Err(CredentialError::CryptoFailure);
        }

        let salt = SaltString::generate(&mut OsRng);
        match self.argon2.hash_password(plaintext.as_bytes(), &salt) {
            Ok(hash) => Ok(hash.to_string().into_bytes()),
            Err(e) => {
                log::error!("password hashing failed: {e}");
                Err(CredentialError::CryptoFailure)
            }
        }
    }

    /// `Ok(false)` is a wrong password; `Err` means the stored credential itself is broken.
    pub fn verify(&self, credential: &[u8], plaintext: &str) -> Result<bool, CredentialError> {
        let encoded =
            std::str::from_utf8(credential).map_err(|_| CredentialError::MalformedCredential)?;
        let parsed =
            PasswordHash::new(encoded).map_err(|_| CredentialError::MalformedCredential)?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(CredentialError::MalformedCredential),
        }
    }
}

#[cfg(test)]
impl CredentialGuard {
    /// Cheapest parameters argon2 accepts, keeps the test suite fast.
    pub(crate) fn fast() -> Self {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, 1, None)
            .expect("minimum argon2 params");
        CredentialGuard::new(params)
    }

    /// Fails every `hash` call the way an unusable random source would.
    pub(crate) fn broken() -> Self {
        CredentialGuard {
            broken: true,
            ..CredentialGuard::fast()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_the_plaintext() {
        let guard = CredentialGuard::fast();
        let credential = guard.hash("pw123").unwrap();
        assert_ne!(credential, b"pw123".to_vec());
        assert!(credential.starts_with(b"$argon2id$"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let guard = CredentialGuard::fast();
        assert_ne!(guard.hash("pw123").unwrap(), guard.hash("pw123").unwrap());
    }

    #[test]
    fn verify_matches_only_the_right_password() {
        let guard = CredentialGuard::fast();
        let credential = guard.hash("pw123").unwrap();
        assert_eq!(guard.verify(&credential, "pw123"), Ok(true));
        assert_eq!(guard.verify(&credential, "wrong"), Ok(false));
        assert_eq!(guard.verify(&credential, ""), Ok(false));
    }

    #[test]
    fn verify_uses_cost_stored_in_the_hash() {
        let credential = CredentialGuard::fast().hash("pw123").unwrap();
        assert_eq!(CredentialGuard::default().verify(&credential, "pw123"), Ok(true));
    }

    #[test]
    fn broken_guard_reports_crypto_failure() {
        assert_eq!(
            CredentialGuard::broken().hash("pw123"),
            Err(CredentialError::CryptoFailure)
        );
    }

    #[test]
    fn garbage_credential_is_malformed_not_a_mismatch() {
        let guard = CredentialGuard::fast();
        assert_eq!(
            guard.verify(b"not a hash", "pw123"),
            Err(CredentialError::MalformedCredential)
        );
        assert_eq!(
            guard.verify(&[0xff, 0xfe, 0x00], "pw123"),
            Err(CredentialError::MalformedCredential)
        );
    }
}
