mod tar;

pub use tar::{read_all, TarEntry, TarError};

/// Data of the first file entry with this exact name, if any. Package
/// archives front-load their metadata members, so this is how callers
/// pull a control file out of a decoded archive.
pub fn first_file<'a>(entries: &'a [TarEntry], name: &str) -> Option<&'a [u8]> {
    entries.iter().find_map(|entry| match entry {
        TarEntry::File { name: n, data } if n == name => Some(data.as_slice()),
        _ => None,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_file_picks_first_match() {
        let entries = vec![
            TarEntry::Directory {
                name: "etc".to_string(),
            },
            TarEntry::File {
                name: "etc/motd".to_string(),
                data: b"one".to_vec(),
            },
            TarEntry::File {
                name: "etc/motd".to_string(),
                data: b"two".to_vec(),
            },
        ];
        assert_eq!(first_file(&entries, "etc/motd"), Some(b"one".as_slice()));
        assert_eq!(first_file(&entries, "etc"), None);
        assert_eq!(first_file(&entries, "missing"), None);
    }
}
