mod package;

pub use package::{Package, PackageError};

/// Immutable, insertion-ordered collection of the packages of one or
/// more repository indices. Order is file order and survives merging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageIndex {
    packages: Vec<Package>,
}

impl PackageIndex {
    /// Assemble an index from per-package record groups, in file order.
    ///
    /// A failed entry fails the whole call; a caller that prefers to
    /// skip broken entries can assemble packages one by one with
    /// [`Package::from_fields`] instead.
    pub fn from_entries<I>(entries: I) -> Result<Self, PackageError>
    where
        I: IntoIterator<Item = Vec<(char, String)>>,
    {
        let packages = entries
            .into_iter()
            .map(Package::from_fields)
            .collect::<Result<_, _>>()?;
        Ok(PackageIndex { packages })
    }

    /// First package with this exact name, in insertion order.
    pub fn first_with_name(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|pkg| pkg.name == name)
    }

    /// Every package with this exact name, in insertion order.
    pub fn all_with_name(&self, name: &str) -> Vec<&Package> {
        self.packages.iter().filter(|pkg| pkg.name == name).collect()
    }

    /// Concatenate indices in argument order. No deduplication and no
    /// re-sorting; each source keeps its internal order.
    pub fn merge<I>(indices: I) -> PackageIndex
    where
        I: IntoIterator<Item = PackageIndex>,
    {
        PackageIndex {
            packages: indices.into_iter().flat_map(|idx| idx.packages).collect(),
        }
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl FromIterator<Package> for PackageIndex {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        PackageIndex {
            packages: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PackageIndex {
    type Item = Package;
    type IntoIter = std::vec::IntoIter<Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.into_iter()
    }
}

impl<'a> IntoIterator for &'a PackageIndex {
    type Item = &'a Package;
    type IntoIter = std::slice::Iter<'a, Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}

#[cfg(test)]
mod test {
    use super::package::test::minimal_fields;
    use super::*;

    fn index_of(names: &[&str]) -> PackageIndex {
        PackageIndex::from_entries(names.iter().map(|name| minimal_fields(name))).unwrap()
    }

    #[test]
    fn lookup_by_name() {
        let index = index_of(&["busybox", "curl", "busybox"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.first_with_name("curl").unwrap().name, "curl");
        assert_eq!(index.all_with_name("busybox").len(), 2);
        assert!(index.first_with_name("zsh").is_none());
        assert!(index.all_with_name("zsh").is_empty());
    }

    #[test]
    fn first_match_is_in_insertion_order() {
        let mut entries = vec![minimal_fields("curl")];
        entries[0].push(('A', "x86_64".to_string()));
        let mut second = minimal_fields("curl");
        second.push(('A', "aarch64".to_string()));
        entries.push(second);

        let index = PackageIndex::from_entries(entries).unwrap();
        assert_eq!(
            index.first_with_name("curl").unwrap().architecture.as_deref(),
            Some("x86_64")
        );
    }

    #[test]
    fn merge_preserves_order() {
        let a = index_of(&["a1", "a2"]);
        let b = index_of(&["b1"]);
        let c = index_of(&["c1", "c2"]);

        let merged = PackageIndex::merge([a, b, c]);
        let names: Vec<_> = merged
            .packages()
            .iter()
            .map(|pkg| pkg.name.as_str())
            .collect();
        assert_eq!(names, vec!["a1", "a2", "b1", "c1", "c2"]);
    }

    #[test]
    fn broken_entry_fails_assembly() {
        let entries = vec![minimal_fields("ok"), vec![('P', "broken".to_string())]];
        assert_eq!(
            PackageIndex::from_entries(entries),
            Err(PackageError::MissingKey('C'))
        );
    }
}
