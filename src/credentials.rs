use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// Decides whether a presented admin secret is acceptable.
pub trait CredentialCheck: Send + Sync {
    fn verify(&self, presented: &str) -> bool;
}

#[derive(Debug)]
pub enum CredentialError {
    EmptyPassword,
    Params(argon2::Error),
    Hash(argon2::password_hash::Error),
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password is empty"),
            Self::Params(e) => write!(f, "argon2 params: {e}"),
            Self::Hash(e) => write!(f, "argon2 hash: {e}"),
        }
    }
}

impl std::error::Error for CredentialError {}

// Admin logins are rare, so the cost leans heavy: 64 MiB, three passes.
const MEMORY_KIB: u32 = 65_536;
const ITERATIONS: u32 = 3;
const PARALLELISM: u32 = 1;

/// An argon2id PHC string for the admin password. Only constructed from a
/// string that parses as argon2id, so `verify` never sees another scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPasswordHash(String);

impl AdminPasswordHash {
    /// `None` for blank input, non-argon2id schemes and malformed PHC strings.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let phc = PasswordHash::new(raw).ok()?;
        (phc.algorithm.as_str() == "argon2id").then(|| Self(raw.to_string()))
    }

    pub fn hash(plaintext: &str) -> Result<Self, CredentialError> {
        if plaintext.trim().is_empty() {
            return Err(CredentialError::EmptyPassword);
        }
        let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
            .map_err(CredentialError::Params)?;
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(CredentialError::Hash)?;
        Ok(Self(phc.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CredentialCheck for AdminPasswordHash {
    fn verify(&self, presented: &str) -> bool {
        if presented.is_empty() {
            return false;
        }
        // Params come from the PHC string itself, not from the constants above.
        PasswordHash::new(&self.0).is_ok_and(|phc| {
            Argon2::default()
                .verify_password(presented.as_bytes(), &phc)
                .is_ok()
        })
    }
}

/// Rejects everything; used when no admin password is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl CredentialCheck for DenyAll {
    fn verify(&self, _presented: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies_only_itself() {
        let hash = AdminPasswordHash::hash("s3cret-admin").unwrap();
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hash.verify("s3cret-admin"));
        assert!(!hash.verify("admin"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn parse_accepts_only_argon2id_phc() {
        let hash = AdminPasswordHash::hash("pw").unwrap();
        assert_eq!(AdminPasswordHash::parse(hash.as_str()), Some(hash.clone()));
        assert_eq!(
            AdminPasswordHash::parse(&format!("  {}\n", hash.as_str())),
            Some(hash)
        );
        assert_eq!(AdminPasswordHash::parse(""), None);
        assert_eq!(AdminPasswordHash::parse("admin"), None);
        assert_eq!(AdminPasswordHash::parse("$argon2id$garbage"), None);
        assert_eq!(
            AdminPasswordHash::parse("$argon2i$v=19$m=16,t=2,p=1$c29tZXNhbHQ$aGFzaGhhc2hoYXNo"),
            None
        );
    }

    #[test]
    fn blank_password_cannot_be_hashed() {
        assert!(matches!(
            AdminPasswordHash::hash("   "),
            Err(CredentialError::EmptyPassword)
        ));
        assert!(!DenyAll.verify("anything"));
    }
}
