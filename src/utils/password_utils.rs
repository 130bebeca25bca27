//! Hachage et vérification des mots de passe

use std::str::FromStr;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHashString, PasswordVerifier, SaltString},
    Argon2, PasswordHasher,
};
use derive_more::derive::Display;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_HASHER: Lazy<Argon2<'static>> = Lazy::new(Argon2::default);

/// Le hash d'un mot de passe vide, à utiliser quand le compte n'existe pas
/// pour éviter une attaque par canal auxiliaire
static EMPTY_HASH: Lazy<PWHash> =
    Lazy::new(|| hash("").expect("Failed to hash the empty password"));

/// Un mot de passe haché
#[derive(Clone, Debug, Display)]
pub struct PWHash(PasswordHashString);

impl PartialEq for PWHash {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl Serialize for PWHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PWHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let hash = PasswordHashString::from_str(&s)
            .map_err(|_| <D::Error as serde::de::Error>::custom("Invalid PHC string"))?;
        Ok(PWHash(hash))
    }
}

/// Calcule un haché a partir d'un mot de passe en clair, en choisissant un sel au hasard
pub fn hash(password: &str) -> Result<PWHash, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = DEFAULT_HASHER
        .hash_password(password.as_bytes(), &salt)?
        .serialize();

    Ok(PWHash(hash))
}

/// Vérifie si le mot de passe correspond au hash stocké.
///
/// Si un hash n'est pas fourni, on teste quand même le mot de passe
/// avec un faux hash pour éviter une timing attack.
pub fn verify(password: &str, maybe_hash: Option<&PWHash>) -> bool {
    let hash = maybe_hash.unwrap_or(&EMPTY_HASH);

    DEFAULT_HASHER
        .verify_password(password.as_bytes(), &hash.0.password_hash())
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hashed = hash("Secret123").unwrap();
        assert!(verify("Secret123", Some(&hashed)));
        assert!(!verify("Secret124", Some(&hashed)));
    }

    #[test]
    fn test_missing_hash_never_verifies() {
        assert!(!verify("Secret123", None));
    }

    #[test]
    fn test_serde_keeps_phc_string() {
        let hashed = hash("Secret123").unwrap();
        let yaml = serde_yaml::to_string(&hashed).unwrap();
        let restored: PWHash = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(restored, hashed);
        assert!(serde_yaml::from_str::<PWHash>("not-a-hash").is_err());
    }
}
