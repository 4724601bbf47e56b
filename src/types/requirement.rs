use nom::{
    bytes::complete::{take_till, take_while1},
    combinator::opt,
    IResult,
};
use std::fmt;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum RequirementError {
    #[error("invalid version specification in {0:?}")]
    InvalidSpec(String),
}

/// Comparator of a version constraint.
///
/// The fuzzy variants denote the loose-match semantics of `~`; how loose
/// is up to the version comparator downstream, we only record the shape.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ConstraintOp {
    Equal,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    FuzzyEqual,
    LessFuzzy,
    GreaterFuzzy,
}

/// Version constraint of a single dependency token.
///
/// The version string is kept verbatim; ordering it against other
/// versions belongs to a comparator, not to this crate.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum VersionSpec {
    Any,
    Conflict,
    Constraint { op: ConstraintOp, version: String },
}

/// A named requirement parsed from a dependency token such as
/// `curl>=7.0`, `!busybox` or a bare `openssl`.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Dependency {
    pub name: String,
    pub spec: VersionSpec,
}

fn is_comparator_char(c: char) -> bool {
    matches!(c, '<' | '=' | '>' | '~')
}

/// Split a token (after conflict stripping) into name, comparator run and
/// version string. The run is the contiguous stretch of comparator
/// characters starting at the first one found; a later stray comparator
/// ends up inside the version string untouched.
fn split_token(i: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (i, name) = take_till(is_comparator_char)(i)?;
    let (i, run) = opt(take_while1(is_comparator_char))(i)?;
    Ok((i, (name, run)))
}

impl VersionSpec {
    fn resolve(conflict: bool, run: Option<&str>, version: &str) -> Option<VersionSpec> {
        let run = match run {
            Some(run) => run,
            None => {
                return Some(if conflict {
                    VersionSpec::Conflict
                } else {
                    VersionSpec::Any
                });
            }
        };

        // A bare `!name` is the only valid use of the conflict marker;
        // combined with any comparator the token is malformed.
        if conflict {
            return None;
        }

        let (mut less, mut greater, mut equal, mut fuzzy) = (false, false, false, false);
        for c in run.chars() {
            match c {
                '<' => less = true,
                '>' => greater = true,
                '=' => equal = true,
                // tilde always implies equality
                '~' => {
                    fuzzy = true;
                    equal = true;
                }
                _ => unreachable!(),
            }
        }

        let op = match (less, greater, equal, fuzzy) {
            // `<=>` says nothing at all about the version
            (true, true, true, false) => return Some(VersionSpec::Any),
            (false, false, true, false) => ConstraintOp::Equal,
            (true, false, false, false) => ConstraintOp::Less,
            (false, true, false, false) => ConstraintOp::Greater,
            (true, false, true, false) => ConstraintOp::LessEqual,
            (false, true, true, false) => ConstraintOp::GreaterEqual,
            (false, false, true, true) => ConstraintOp::FuzzyEqual,
            (true, false, true, true) => ConstraintOp::LessFuzzy,
            (false, true, true, true) => ConstraintOp::GreaterFuzzy,
            _ => return None,
        };

        Some(VersionSpec::Constraint {
            op,
            version: version.to_string(),
        })
    }
}

impl TryFrom<&str> for Dependency {
    type Error = RequirementError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        let (conflict, rest) = match token.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, token),
        };

        let (version, (name, run)) = split_token(rest)
            .map_err(|_| RequirementError::InvalidSpec(token.to_string()))?;

        let spec = VersionSpec::resolve(conflict, run, version)
            .ok_or_else(|| RequirementError::InvalidSpec(token.to_string()))?;

        Ok(Dependency {
            name: name.to_string(),
            spec,
        })
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ConstraintOp::Equal => "=",
            ConstraintOp::Less => "<",
            ConstraintOp::Greater => ">",
            ConstraintOp::LessEqual => "<=",
            ConstraintOp::GreaterEqual => ">=",
            ConstraintOp::FuzzyEqual => "~",
            ConstraintOp::LessFuzzy => "<~",
            ConstraintOp::GreaterFuzzy => ">~",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.spec {
            VersionSpec::Any => write!(f, "{}", self.name),
            VersionSpec::Conflict => write!(f, "!{}", self.name),
            VersionSpec::Constraint { op, version } => {
                write!(f, "{}{}{}", self.name, op, version)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn constraint(op: ConstraintOp, version: &str) -> VersionSpec {
        VersionSpec::Constraint {
            op,
            version: version.to_string(),
        }
    }

    #[test]
    fn dep_parse() {
        let source = vec![
            ("openssl", "openssl", VersionSpec::Any),
            ("!busybox", "busybox", VersionSpec::Conflict),
            ("curl>=7.0", "curl", constraint(ConstraintOp::GreaterEqual, "7.0")),
            ("foo=1.2.3-r0", "foo", constraint(ConstraintOp::Equal, "1.2.3-r0")),
            ("foo<2", "foo", constraint(ConstraintOp::Less, "2")),
            ("foo>2", "foo", constraint(ConstraintOp::Greater, "2")),
            ("foo<=2.4", "foo", constraint(ConstraintOp::LessEqual, "2.4")),
            ("foo~1.2", "foo", constraint(ConstraintOp::FuzzyEqual, "1.2")),
            ("foo<~1.2", "foo", constraint(ConstraintOp::LessFuzzy, "1.2")),
            ("foo>~1.2", "foo", constraint(ConstraintOp::GreaterFuzzy, "1.2")),
            // An all-bits comparator means no constraint at all
            ("foo<=>1.0", "foo", VersionSpec::Any),
            // Only the first contiguous run is the comparator; the rest
            // belongs to the version string
            ("foo>=1.0<2", "foo", constraint(ConstraintOp::GreaterEqual, "1.0<2")),
            // Empty name is odd but grammatical
            ("=1.0", "", constraint(ConstraintOp::Equal, "1.0")),
        ];

        for (token, name, spec) in source {
            let dep = Dependency::try_from(token).unwrap();
            assert_eq!(dep.name, name, "name of {token}");
            assert_eq!(dep.spec, spec, "spec of {token}");
        }
    }

    #[test]
    fn dep_parse_invalid() {
        // Conflict marker combined with a comparator
        assert_eq!(
            Dependency::try_from("!foo<1.0"),
            Err(RequirementError::InvalidSpec("!foo<1.0".to_string()))
        );
        // Less and greater without equality resolve to nothing
        assert!(Dependency::try_from("foo<>1.0").is_err());
    }

    #[test]
    fn dep_display_round_trip() {
        for token in ["openssl", "!busybox", "curl>=7.0", "foo~1.2"] {
            assert_eq!(Dependency::try_from(token).unwrap().to_string(), token);
        }
    }

    #[test]
    fn dep_set_membership() {
        let mut set = HashSet::new();
        set.insert(Dependency::try_from("curl>=7.0").unwrap());
        assert!(set.contains(&Dependency::try_from("curl>=7.0").unwrap()));
        assert!(!set.contains(&Dependency::try_from("curl>7.0").unwrap()));
    }

    #[test]
    fn same_token_parses_identically() {
        let a = Dependency::try_from("zlib~1.2").unwrap();
        let b = Dependency::try_from("zlib~1.2").unwrap();
        assert_eq!(a, b);
    }
}
