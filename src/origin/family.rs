//! origin::family
//!
//! Ordering of project names that belong to a product family.
//!
//! # Design
//!
//! Project names such as `SUSE:SLE-15-SP2:Update` encode a family, a major
//! and minor version, and a colon-separated channel tail. Plain string order
//! gets these wrong (`SP10` before `SP2`, bare `15` after its service
//! packs), so names are projected onto a numeric key:
//!
//! ```text
//! key = major + 0.01 * minor + tail
//! ```
//!
//! where `tail` adds `0.0005` for an `Update` component, `0.0006` for a
//! `workarounds` component and `0.0001` when the tail has more than one
//! component. These constants are fixed policy; downstream ordering depends
//! on their exact relative magnitudes.
//!
//! Names that do not parse get the key `0.0`.

use regex::Regex;
use std::sync::OnceLock;

/// Tail increment for an `Update` channel.
const UPDATE_MOD: f64 = 0.0005;

/// Tail increment for a `workarounds` channel.
const WORKAROUNDS_MOD: f64 = 0.0006;

/// Tail increment for a tail with more than one component.
const MULTI_PART_MOD: f64 = 0.0001;

fn family_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<family>SUSE:[^:-]+|openSUSE:[^:]+)[:-](?P<major>[0-9]+)((\.|-SP)(?P<minor>[0-9]+))?(:(?P<tail>.+))?$",
        )
        .expect("family pattern is valid")
    })
}

/// The parsed components of a family project name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyName<'a> {
    /// Family prefix, e.g. `SUSE:SLE` or `openSUSE:Leap`
    pub family: &'a str,
    /// Major version digits
    pub major: &'a str,
    /// Minor version (or service pack) digits
    pub minor: Option<&'a str>,
    /// Everything after the version, without the leading colon
    pub tail: Option<&'a str>,
}

impl<'a> FamilyName<'a> {
    /// Parse a project name, returning `None` if it is not a family name.
    ///
    /// ```
    /// use obs_origin::origin::family::FamilyName;
    ///
    /// let name = FamilyName::parse("SUSE:SLE-15-SP2:Update").unwrap();
    /// assert_eq!(name.family, "SUSE:SLE");
    /// assert_eq!(name.major, "15");
    /// assert_eq!(name.minor, Some("2"));
    /// assert_eq!(name.tail, Some("Update"));
    ///
    /// assert!(FamilyName::parse("openSUSE:Factory").is_none());
    /// ```
    pub fn parse(name: &'a str) -> Option<Self> {
        let captures = family_pattern().captures(name)?;
        Some(Self {
            family: captures.name("family")?.as_str(),
            major: captures.name("major")?.as_str(),
            minor: captures.name("minor").map(|m| m.as_str()),
            tail: captures.name("tail").map(|m| m.as_str()),
        })
    }

    /// Numeric ordering key of this name.
    pub fn sort_key(&self) -> f64 {
        let mut tail_mod = 0.0;
        if let Some(tail) = self.tail {
            let parts: Vec<&str> = tail.split(':').collect();
            if parts.contains(&"Update") {
                tail_mod += UPDATE_MOD;
            }
            if parts.contains(&"workarounds") {
                tail_mod += WORKAROUNDS_MOD;
            }
            if parts.len() > 1 {
                tail_mod += MULTI_PART_MOD;
            }
        }

        let major: f64 = self.major.parse().unwrap_or(0.0);
        let minor: f64 = self.minor.and_then(|m| m.parse().ok()).unwrap_or(0.0);
        major + 0.01 * minor + tail_mod
    }
}

/// Numeric ordering key of a project name; `0.0` for non-family names.
///
/// ```
/// use obs_origin::origin::family::family_sort_key;
///
/// assert!(family_sort_key("SUSE:SLE-15-SP2:Update") > family_sort_key("SUSE:SLE-15-SP1:Update"));
/// assert_eq!(family_sort_key("openSUSE:Factory"), 0.0);
/// ```
pub fn family_sort_key(name: &str) -> f64 {
    FamilyName::parse(name).map_or(0.0, |f| f.sort_key())
}

/// Family prefix of a project name, if it is a family name.
pub fn family_of(name: &str) -> Option<&str> {
    FamilyName::parse(name).map(|f| f.family)
}

/// Sort names by descending family key, keeping the input order of ties.
pub fn sort_descending<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| family_sort_key(b.as_ref()).total_cmp(&family_sort_key(a.as_ref())));
}

/// Lazily reorders consecutive runs of same-family project names.
///
/// Created by [`family_sorted`].
#[derive(Debug)]
pub struct FamilySorted<'a, S> {
    names: &'a [S],
    position: usize,
    run: std::vec::IntoIter<&'a S>,
}

impl<'a, S: AsRef<str>> Iterator for FamilySorted<'a, S> {
    type Item = &'a S;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.run.next() {
            return Some(name);
        }

        let first = self.names.get(self.position)?;
        let Some(family) = family_of(first.as_ref()) else {
            self.position += 1;
            return Some(first);
        };

        let run_len = 1 + self.names[self.position + 1..]
            .iter()
            .take_while(|name| family_of(name.as_ref()) == Some(family))
            .count();

        let mut run: Vec<&'a S> = self.names[self.position..self.position + run_len]
            .iter()
            .collect();
        self.position += run_len;

        if run.len() > 1 {
            sort_descending(&mut run);
        }
        self.run = run.into_iter();
        self.run.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.run.len() + self.names.len() - self.position;
        (remaining, Some(remaining))
    }
}

/// Reorder each maximal run of consecutive same-family names by descending
/// key. Names outside a run, and the order between runs, are untouched.
///
/// ```
/// use obs_origin::origin::family::family_sorted;
///
/// let names = [
///     "<devel>",
///     "SUSE:SLE-15:Update",
///     "SUSE:SLE-15-SP2:Update",
///     "SUSE:SLE-15-SP1:Update",
///     "openSUSE:Factory",
/// ];
/// let sorted: Vec<&str> = family_sorted(&names).copied().collect();
/// assert_eq!(
///     sorted,
///     [
///         "<devel>",
///         "SUSE:SLE-15-SP2:Update",
///         "SUSE:SLE-15-SP1:Update",
///         "SUSE:SLE-15:Update",
///         "openSUSE:Factory",
///     ]
/// );
/// ```
pub fn family_sorted<S: AsRef<str>>(names: &[S]) -> FamilySorted<'_, S> {
    FamilySorted {
        names,
        position: 0,
        run: Vec::new().into_iter(),
    }
}
