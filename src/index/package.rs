use crate::types::Checksum;
use chrono::{DateTime, Utc};
use log::debug;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PackageError {
    #[error("bad value for key '{0}'")]
    BadValue(char),
    #[error("missing required key '{0}'")]
    MissingKey(char),
}

/// One entry of a repository package index, immutable once assembled.
///
/// Dependency, provides and install-if entries are kept as the raw
/// space-separated tokens from the index; run them through
/// [`Dependency::try_from`](crate::types::Dependency) when structure is
/// needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Package {
    pub index_checksum: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub url: String,
    pub license: String,
    pub package_size: u64,
    pub installed_size: u64,
    pub architecture: Option<String>,
    pub origin: Option<String>,
    pub maintainer: Option<String>,
    pub build_time: Option<DateTime<Utc>>,
    pub commit: Option<String>,
    pub provider_priority: Option<u16>,
    pub dependencies: Vec<String>,
    pub provides: Vec<String>,
    pub install_if: Vec<String>,
}

impl Package {
    /// Assemble one package from the key/value records of a single index
    /// entry, in file order. Later records overwrite earlier ones with
    /// the same key.
    pub fn from_fields<I>(fields: I) -> Result<Self, PackageError>
    where
        I: IntoIterator<Item = (char, String)>,
    {
        let mut index_checksum = None;
        let mut name = None;
        let mut version = None;
        let mut description = None;
        let mut url = None;
        let mut license = None;
        let mut package_size = None;
        let mut installed_size = None;

        let mut architecture = None;
        let mut origin = None;
        let mut maintainer = None;
        let mut build_time = None;
        let mut commit = None;
        let mut provider_priority = None;

        let mut dependencies = Vec::new();
        let mut provides = Vec::new();
        let mut install_if = Vec::new();

        for (key, value) in fields {
            match key {
                'P' => name = Some(value),
                'V' => version = Some(value),
                'T' => description = Some(value),
                'U' => url = Some(value),
                'L' => license = Some(value),
                'A' => architecture = Some(value),
                'D' => dependencies = split_tokens(&value),
                'p' => provides = split_tokens(&value),
                'i' => install_if = split_tokens(&value),
                // base64/hex digest token, decodable via `checksum()`
                'C' => index_checksum = Some(value),
                'S' => package_size = Some(parse_number(&value, 'S')?),
                'I' => installed_size = Some(parse_number(&value, 'I')?),
                'o' => origin = Some(value),
                'm' => maintainer = Some(value),
                't' => build_time = Some(parse_build_time(&value)?),
                'c' => commit = Some(value),
                'k' => {
                    provider_priority =
                        Some(value.parse().map_err(|_| PackageError::BadValue('k'))?);
                }
                // Keys of the on-disk installed database, meaningless in
                // a repository index
                'F' | 'M' | 'R' | 'Z' | 'r' | 'q' | 'a' | 's' | 'f' => (),
                _ if key.is_ascii_lowercase() => {
                    debug!("Ignoring unknown index key '{key}'");
                }
                _ => return Err(PackageError::BadValue(key)),
            }
        }

        Ok(Package {
            index_checksum: index_checksum.ok_or(PackageError::MissingKey('C'))?,
            name: name.ok_or(PackageError::MissingKey('P'))?,
            version: version.ok_or(PackageError::MissingKey('V'))?,
            description: description.ok_or(PackageError::MissingKey('T'))?,
            url: url.ok_or(PackageError::MissingKey('U'))?,
            license: license.ok_or(PackageError::MissingKey('L'))?,
            package_size: package_size.ok_or(PackageError::MissingKey('S'))?,
            installed_size: installed_size.ok_or(PackageError::MissingKey('I'))?,
            architecture,
            origin,
            maintainer,
            build_time,
            commit,
            provider_priority,
            dependencies,
            provides,
            install_if,
        })
    }

    /// Decoded form of the raw index checksum token, when decodable.
    /// Repositories do ship garbled checksums; that is absence, not an
    /// error.
    pub fn checksum(&self) -> Option<Checksum> {
        Checksum::decode(&self.index_checksum)
    }

    /// File name this package is published under in a repository.
    pub fn download_filename(&self) -> String {
        format!("{}-{}.apk", self.name, self.version)
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pkg({})", self.name)
    }
}

fn split_tokens(value: &str) -> Vec<String> {
    // Single-space separation, exactly; the index format never emits
    // consecutive separators
    value.split(' ').map(str::to_string).collect()
}

fn parse_number(value: &str, key: char) -> Result<u64, PackageError> {
    value.parse().map_err(|_| PackageError::BadValue(key))
}

fn parse_build_time(value: &str) -> Result<DateTime<Utc>, PackageError> {
    let secs: u64 = value.parse().map_err(|_| PackageError::BadValue('t'))?;
    let secs = i64::try_from(secs).map_err(|_| PackageError::BadValue('t'))?;
    DateTime::from_timestamp(secs, 0).ok_or(PackageError::BadValue('t'))
}
