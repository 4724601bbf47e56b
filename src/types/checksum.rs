use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt::Display;

/// A package content digest, tagged with its hash algorithm.
///
/// The digest length is carried by the variant, so a constructed value is
/// always well-formed.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Checksum {
    Md5([u8; 16]),
    Sha1([u8; 20]),
    Sha256([u8; 32]),
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ChecksumKind {
    Md5,
    Sha1,
    Sha256,
}

impl Checksum {
    /// Decode an index checksum token.
    ///
    /// Tokens come in two shapes: the modern form is an encoding letter
    /// ('Q' for base64, 'X' for hex) followed by a digest digit ('1' for
    /// SHA-1, '2' for SHA-256) and the encoded bytes; the legacy form is a
    /// bare 32-character hex MD5. A garbled token is treated as an absent
    /// checksum rather than an error, so this returns an `Option`.
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = token.as_bytes();
        if bytes.len() < 2 {
            return None;
        }

        if bytes[0].is_ascii_hexdigit() {
            // Legacy MD5 hex digest mode
            if bytes.len() != 32 {
                return None;
            }
            let decoded = hex::decode(token).ok()?;
            return Self::from_bytes(ChecksumKind::Md5, &decoded);
        }

        let kind = match bytes[1] {
            b'1' => ChecksumKind::Sha1,
            b'2' => ChecksumKind::Sha256,
            _ => return None,
        };
        let decoded = match bytes[0] {
            b'Q' => BASE64.decode(&token[2..]).ok()?,
            b'X' => hex::decode(&token[2..]).ok()?,
            _ => return None,
        };
        Self::from_bytes(kind, &decoded)
    }

    /// Construct a checksum from raw digest bytes, failing if the length
    /// does not match the kind.
    pub fn from_bytes(kind: ChecksumKind, bytes: &[u8]) -> Option<Self> {
        match kind {
            ChecksumKind::Md5 => bytes.try_into().ok().map(Checksum::Md5),
            ChecksumKind::Sha1 => bytes.try_into().ok().map(Checksum::Sha1),
            ChecksumKind::Sha256 => bytes.try_into().ok().map(Checksum::Sha256),
        }
    }

    pub fn kind(&self) -> ChecksumKind {
        match self {
            Checksum::Md5(_) => ChecksumKind::Md5,
            Checksum::Sha1(_) => ChecksumKind::Sha1,
            Checksum::Sha256(_) => ChecksumKind::Sha256,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Checksum::Md5(b) => b,
            Checksum::Sha1(b) => b,
            Checksum::Sha256(b) => b,
        }
    }

    pub fn validator(&self) -> ChecksumValidator {
        match self {
            Checksum::Md5(c) => ChecksumValidator::Md5((*c, Md5::new())),
            Checksum::Sha1(c) => ChecksumValidator::Sha1((*c, Sha1::new())),
            Checksum::Sha256(c) => ChecksumValidator::Sha256((*c, Sha256::new())),
        }
    }

    /// One-shot check of a fully buffered payload against this checksum.
    pub fn matches(&self, data: impl AsRef<[u8]>) -> bool {
        let mut validator = self.validator();
        validator.update(data);
        validator.finish()
    }
}

/// Incremental verifier for callers that receive payload bytes in chunks.
pub enum ChecksumValidator {
    Md5(([u8; 16], Md5)),
    Sha1(([u8; 20], Sha1)),
    Sha256(([u8; 32], Sha256)),
}

impl ChecksumValidator {
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        match self {
            ChecksumValidator::Md5((_, v)) => v.update(data),
            ChecksumValidator::Sha1((_, v)) => v.update(data),
            ChecksumValidator::Sha256((_, v)) => v.update(data),
        }
    }

    pub fn finish(self) -> bool {
        match self {
            ChecksumValidator::Md5((c, v)) => v.finalize()[..] == c,
            ChecksumValidator::Sha1((c, v)) => v.finalize()[..] == c,
            ChecksumValidator::Sha256((c, v)) => v.finalize()[..] == c,
        }
    }
}

impl Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Checksum::Md5(b) => {
                f.write_str("md5::")?;
                f.write_str(&hex::encode(b))
            }
            Checksum::Sha1(b) => {
                f.write_str("sha1::")?;
                f.write_str(&hex::encode(b))
            }
            Checksum::Sha256(b) => {
                f.write_str("sha256::")?;
                f.write_str(&hex::encode(b))
            }
        }
    }
}
