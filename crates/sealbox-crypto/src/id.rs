//! Algorithm identifiers from the HPKE IANA registries, plus the ciphersuite
//! triple and its `suite_id` encoding.

use crate::CryptoError;

macro_rules! algorithm_registry {
    (
        #[repr($uint:ty)]
        $(#[$enum_meta:meta])*
        $vis:vis enum $name:ident
        {
            $(
                $(#[doc = $variant_doc:literal])*
                $variant:ident = $value:literal
            ),+
            $(,)?
        }
    ) => {
        #[non_exhaustive]
        #[allow(non_camel_case_types)]
        #[derive(PartialEq, Eq, Hash, Clone, Copy)]
        #[repr($uint)]
        $(#[$enum_meta])*
        $vis enum $name {
            $(
                $(#[doc = $variant_doc])*
                $variant = $value,
            )+
        }

        impl $name {
            /// Every identifier in the recognized set.
            $vis const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Looks an identifier up by its IANA code point.
            ///
            /// # Errors
            ///
            /// [`CryptoError::UnsupportedAlgorithm`] if the code point is not
            /// in the recognized set.
            $vis const fn try_from_int(value: $uint) -> Result<Self, CryptoError> {
                match value {
                    $(
                        $value => Ok(Self::$variant),
                    )+
                    _ => Err(CryptoError::UnsupportedAlgorithm),
                }
            }

            /// Returns the IANA code point of this identifier.
            $vis const fn to_int(self) -> $uint {
                self as $uint
            }

            /// Returns `I2OSP(id, 2)`, the big-endian wire encoding of the
            /// code point.
            $vis const fn to_be_bytes(self) -> [u8; core::mem::size_of::<$uint>()] {
                self.to_int().to_be_bytes()
            }

            /// Returns the registry name of this identifier.
            $vis const fn as_str(self) -> &'static str {
                match self {
                    $(
                        Self::$variant => stringify!($variant),
                    )+
                }
            }
        }

        impl From<$name> for $uint {
            fn from(value: $name) -> Self {
                value.to_int()
            }
        }

        impl TryFrom<$uint> for $name {
            type Error = CryptoError;

            fn try_from(value: $uint) -> Result<Self, Self::Error> {
                Self::try_from_int(value)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{:?}", self)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.to_int().serialize(serializer)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = <$uint>::deserialize(deserializer)?;

                Self::try_from_int(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

algorithm_registry!(
    #[repr(u16)]
    /// Key Encapsulation Mechanism identifiers.
    pub enum KemId {
        /// DHKEM(P-256, HKDF-SHA256)
        DHKEM_P256_SHA256 = 0x0010,

        /// DHKEM(P-384, HKDF-SHA384)
        DHKEM_P384_SHA384 = 0x0011,

        /// DHKEM(P-521, HKDF-SHA512)
        DHKEM_P521_SHA512 = 0x0012,

        /// DHKEM(X25519, HKDF-SHA256)
        DHKEM_X25519_SHA256 = 0x0020,

        /// DHKEM(X448, HKDF-SHA512)
        DHKEM_X448_SHA512 = 0x0021,
    }
);

impl KemId {
    /// The KDF this DHKEM is built on.
    pub const fn kdf_id(self) -> KdfId {
        match self {
            Self::DHKEM_P256_SHA256 | Self::DHKEM_X25519_SHA256 => KdfId::HKDF_SHA256,
            Self::DHKEM_P384_SHA384 => KdfId::HKDF_SHA384,
            Self::DHKEM_P521_SHA512 | Self::DHKEM_X448_SHA512 => KdfId::HKDF_SHA512,
        }
    }

    /// Length in bytes of the KEM shared secret (`Nsecret`).
    pub const fn n_secret(self) -> usize {
        match self {
            Self::DHKEM_P256_SHA256 | Self::DHKEM_X25519_SHA256 => 32,
            Self::DHKEM_P384_SHA384 => 48,
            Self::DHKEM_P521_SHA512 | Self::DHKEM_X448_SHA512 => 64,
        }
    }

    /// Length in bytes of the encapsulated key (`Nenc`).
    pub const fn n_enc(self) -> usize {
        self.n_pk()
    }

    /// Length in bytes of a serialized public key (`Npk`).
    ///
    /// The NIST curves use the uncompressed SEC1 encoding.
    pub const fn n_pk(self) -> usize {
        match self {
            Self::DHKEM_P256_SHA256 => 65,
            Self::DHKEM_P384_SHA384 => 97,
            Self::DHKEM_P521_SHA512 => 133,
            Self::DHKEM_X25519_SHA256 => 32,
            Self::DHKEM_X448_SHA512 => 56,
        }
    }

    /// Length in bytes of a serialized private key (`Nsk`).
    pub const fn n_sk(self) -> usize {
        match self {
            Self::DHKEM_P256_SHA256 | Self::DHKEM_X25519_SHA256 => 32,
            Self::DHKEM_P384_SHA384 => 48,
            Self::DHKEM_P521_SHA512 => 66,
            Self::DHKEM_X448_SHA512 => 56,
        }
    }

    /// The bitmask applied to the first candidate byte during
    /// `DeriveKeyPair()` rejection sampling, or `None` for the Montgomery
    /// curves where the KDF output is used as the scalar directly.
    pub const fn sk_bitmask(self) -> Option<u8> {
        match self {
            Self::DHKEM_P256_SHA256 | Self::DHKEM_P384_SHA384 => Some(0xff),
            Self::DHKEM_P521_SHA512 => Some(0x01),
            Self::DHKEM_X25519_SHA256 | Self::DHKEM_X448_SHA512 => None,
        }
    }

    /// The KEM-scoped domain separator used by the labeled KDF calls inside
    /// the DHKEM construction: `"KEM" || I2OSP(kem_id, 2)`.
    pub const fn suite_id(self) -> [u8; 5] {
        let id = self.to_be_bytes();

        [b'K', b'E', b'M', id[0], id[1]]
    }
}

algorithm_registry!(
    #[repr(u16)]
    /// Key Derivation Function identifiers.
    pub enum KdfId {
        /// HKDF-SHA256
        HKDF_SHA256 = 0x0001,

        /// HKDF-SHA384
        HKDF_SHA384 = 0x0002,

        /// HKDF-SHA512
        HKDF_SHA512 = 0x0003,
    }
);

impl KdfId {
    /// Length in bytes of the underlying hash output (`Nh`).
    pub const fn n_hash(self) -> usize {
        match self {
            Self::HKDF_SHA256 => 32,
            Self::HKDF_SHA384 => 48,
            Self::HKDF_SHA512 => 64,
        }
    }
}

algorithm_registry!(
    #[repr(u16)]
    /// AEAD identifiers.
    pub enum AeadId {
        /// AES-128-GCM
        AES_128_GCM = 0x0001,

        /// AES-256-GCM
        AES_256_GCM = 0x0002,

        /// ChaCha20-Poly1305
        CHACHA20_POLY1305 = 0x0003,

        /// Export-only: the context carries no AEAD key and only serves the
        /// secret export interface.
        EXPORT_ONLY = 0xFFFF,
    }
);

impl AeadId {
    /// Length in bytes of the AEAD key (`Nk`).
    pub const fn n_key(self) -> usize {
        match self {
            Self::AES_128_GCM => 16,
            Self::AES_256_GCM | Self::CHACHA20_POLY1305 => 32,
            Self::EXPORT_ONLY => 0,
        }
    }

    /// Length in bytes of the AEAD nonce (`Nn`).
    pub const fn n_nonce(self) -> usize {
        match self {
            Self::AES_128_GCM | Self::AES_256_GCM | Self::CHACHA20_POLY1305 => 12,
            Self::EXPORT_ONLY => 0,
        }
    }

    /// Length in bytes of the authentication tag (`Nt`).
    pub const fn n_tag(self) -> usize {
        match self {
            Self::AES_128_GCM | Self::AES_256_GCM | Self::CHACHA20_POLY1305 => 16,
            Self::EXPORT_ONLY => 0,
        }
    }
}

/// A ciphersuite is the (KEM, KDF, AEAD) triple a configuration commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSuite {
    /// KEM algorithm identifier.
    pub kem: KemId,

    /// KDF algorithm identifier.
    pub kdf: KdfId,

    /// AEAD algorithm identifier.
    pub aead: AeadId,
}

impl CipherSuite {
    /// The 10-byte domain separator carried into every labeled KDF call made
    /// by the key schedule and the export interface:
    ///
    /// ```text
    /// suite_id = concat(
    ///   "HPKE",
    ///   I2OSP(kem_id, 2),
    ///   I2OSP(kdf_id, 2),
    ///   I2OSP(aead_id, 2)
    /// )
    /// ```
    pub const fn suite_id(self) -> [u8; 10] {
        let kem = self.kem.to_be_bytes();
        let kdf = self.kdf.to_be_bytes();
        let aead = self.aead.to_be_bytes();

        [
            b'H', b'P', b'K', b'E', kem[0], kem[1], kdf[0], kdf[1], aead[0], aead[1],
        ]
    }
}
