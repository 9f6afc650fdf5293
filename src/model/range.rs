//! Version ranges as a disjunction of `semver` requirement sets.
//!
//! A [`Range`] holds OR-ed branches; each branch is an AND-ed
//! [`VersionReq`]. A range with no branches at all is unconstrained: it
//! serialises to the empty string and accepts every release.
//!
//! Branch text follows the node-style convention used by the documentation
//! sources: comparators are separated by spaces (commas also accepted) and a
//! bare version such as `1.2.3` or `1.2` means exactly that release (or
//! release line) rather than `semver`'s default caret.

use crate::error::{Error, Result};
use semver::{BuildMetadata, Comparator, Op, Version, VersionReq};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const OR: &str = "||";

/// Set of releases a declaration is valid for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Range {
    branches: Vec<VersionReq>,
}

impl Range {
    /// The unconstrained range.
    pub fn any() -> Self {
        Self::default()
    }

    /// A range accepting exactly one release.
    pub fn exact(version: &Version) -> Self {
        Range {
            branches: vec![exact_req(version)],
        }
    }

    /// Parse `a || b c || ...` range text.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Range::any());
        }
        let branches = trimmed
            .split(OR)
            .map(|branch| parse_branch(branch, input))
            .collect::<Result<Vec<_>>>()?;
        Ok(Range { branches })
    }

    pub fn branches(&self) -> &[VersionReq] {
        &self.branches
    }

    pub fn is_any(&self) -> bool {
        self.branches.is_empty()
    }

    /// True when `version` is accepted by at least one branch.
    pub fn satisfies(&self, version: &Version) -> bool {
        self.is_any() || self.branches.iter().any(|branch| branch.matches(version))
    }

    /// OR both ranges together. Branches are appended, never collapsed, so
    /// `a || a` stays two branches.
    pub fn union(&self, other: &Range) -> Range {
        if self.is_any() || other.is_any() {
            return Range::any();
        }
        let mut branches = self.branches.clone();
        branches.extend(other.branches.iter().cloned());
        Range { branches }
    }

    /// Conservative subset test.
    ///
    /// Every branch is reduced to one interval of releases and `self` is a
    /// subset when each of its intervals fits inside the union of `other`'s.
    /// A comparator whose interval cannot be derived answers `false`.
    ///
    /// Pre-releases only match a branch that names the same `x.y.z` with a
    /// pre-release tag, so a branch of `self` carrying one needs a single
    /// branch of `other` that does the same and spans it whole.
    pub fn is_subset_of(&self, other: &Range) -> bool {
        if other.is_any() {
            return true;
        }
        // unconstrained accepts every pre-release, a bounded range never does
        if self.is_any() {
            return false;
        }
        let covering = merge_intervals(other.branches.iter().filter_map(branch_interval).collect());
        self.branches.iter().all(|branch| match branch_interval(branch) {
            Some(interval) => {
                covers(&covering, &interval) && pre_releases_covered(branch, &interval, other)
            }
            None => false,
        })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A lone exact release keeps its `=` so it does not read back as a
        // point version.
        if let [branch] = self.branches.as_slice() {
            if let [c] = branch.comparators.as_slice() {
                if c.op == Op::Exact && c.minor.is_some() && c.patch.is_some() {
                    return write!(f, "{c}");
                }
            }
        }
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            write_branch(f, branch)?;
        }
        Ok(())
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Range::parse(s)
    }
}

fn exact_req(version: &Version) -> VersionReq {
    VersionReq {
        comparators: vec![Comparator {
            op: Op::Exact,
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            pre: version.pre.clone(),
        }],
    }
}

fn is_operator(token: &str) -> bool {
    token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^'))
}

/// `1` or `1.2`: a release line written without an operator.
fn is_partial_version(token: &str) -> bool {
    token.split('.').count() <= 2
        && token
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_branch(branch: &str, whole: &str) -> Result<VersionReq> {
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();

    for token in branch
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        // `> 1.0.0` arrives as two tokens
        if is_operator(token) {
            pending_op.push_str(token);
            continue;
        }
        let op = std::mem::take(&mut pending_op);
        if op.is_empty() && (Version::parse(token).is_ok() || is_partial_version(token)) {
            comparators.push(format!("={}", token));
        } else {
            comparators.push(format!("{}{}", op, token));
        }
    }
    if !pending_op.is_empty() {
        comparators.push(pending_op);
    }

    if comparators.is_empty() {
        return Err(Error::EmptyRangeBranch(whole.to_string()));
    }

    VersionReq::parse(&comparators.join(", ")).map_err(|source| Error::InvalidVersion {
        input: whole.to_string(),
        source,
    })
}

fn write_branch(f: &mut fmt::Formatter<'_>, req: &VersionReq) -> fmt::Result {
    if req.comparators.is_empty() {
        return f.write_str("*");
    }
    for (i, c) in req.comparators.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        match (c.op, c.minor, c.patch) {
            (Op::Exact, Some(minor), Some(patch)) => {
                write!(f, "{}.{}.{}", c.major, minor, patch)?;
                if !c.pre.is_empty() {
                    write!(f, "-{}", c.pre)?;
                }
            }
            _ => write!(f, "{c}")?,
        }
    }
    Ok(())
}

// -- Intervals ----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Bound {
    Unbounded,
    Included(Version),
    Excluded(Version),
}

/// Contiguous span of releases between two bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    lower: Bound,
    upper: Bound,
}

impl Interval {
    fn full() -> Self {
        Interval {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    fn intersect(self, other: Interval) -> Interval {
        let lower = if cmp_lower(&self.lower, &other.lower) == Ordering::Greater {
            self.lower
        } else {
            other.lower
        };
        let upper = if cmp_upper(&self.upper, &other.upper) == Ordering::Less {
            self.upper
        } else {
            other.upper
        };
        Interval { lower, upper }
    }

    fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => false,
            (Bound::Included(lo), Bound::Included(hi)) => lo > hi,
            (
                Bound::Included(lo) | Bound::Excluded(lo),
                Bound::Included(hi) | Bound::Excluded(hi),
            ) => lo >= hi,
        }
    }

    fn contains(&self, other: &Interval) -> bool {
        other.is_empty()
            || (cmp_lower(&self.lower, &other.lower) != Ordering::Greater
                && cmp_upper(&other.upper, &self.upper) != Ordering::Greater)
    }
}

/// Sort key for a finite bound. `included_rank` orders the inclusive form of
/// a bound against the exclusive one at the same release.
fn finite_key(bound: &Bound, included_rank: u8) -> Option<(&Version, u8)> {
    match bound {
        Bound::Unbounded => None,
        Bound::Included(v) => Some((v, included_rank)),
        Bound::Excluded(v) => Some((v, 1 - included_rank)),
    }
}

fn cmp_lower(a: &Bound, b: &Bound) -> Ordering {
    match (finite_key(a, 0), finite_key(b, 0)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

fn cmp_upper(a: &Bound, b: &Bound) -> Ordering {
    match (finite_key(a, 1), finite_key(b, 1)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

/// Whether an interval ending at `upper` runs into one starting at `lower`.
fn touches(upper: &Bound, lower: &Bound) -> bool {
    match (upper, lower) {
        (Bound::Unbounded, _) | (_, Bound::Unbounded) => true,
        (Bound::Excluded(u), Bound::Excluded(l)) => l < u,
        (
            Bound::Included(u) | Bound::Excluded(u),
            Bound::Included(l) | Bound::Excluded(l),
        ) => l <= u,
    }
}

fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(|i| !i.is_empty());
    intervals.sort_by(|a, b| cmp_lower(&a.lower, &b.lower));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if touches(&last.upper, &interval.lower) {
                if cmp_upper(&interval.upper, &last.upper) == Ordering::Greater {
                    last.upper = interval.upper;
                }
                continue;
            }
        }
        merged.push(interval);
    }
    merged
}

fn covers(merged: &[Interval], target: &Interval) -> bool {
    target.is_empty() || merged.iter().any(|i| i.contains(target))
}

fn pre_releases_covered(branch: &VersionReq, interval: &Interval, other: &Range) -> bool {
    branch.comparators.iter().filter(|c| !c.pre.is_empty()).all(|c| {
        other.branches.iter().any(|candidate| {
            allows_pre_release_of(candidate, c)
                && branch_interval(candidate).is_some_and(|span| span.contains(interval))
        })
    })
}

/// Whether `req` names the same full release as `c` with a pre-release tag.
fn allows_pre_release_of(req: &VersionReq, c: &Comparator) -> bool {
    req.comparators.iter().any(|own| {
        !own.pre.is_empty()
            && own.major == c.major
            && own.minor.is_some()
            && own.minor == c.minor
            && own.patch.is_some()
            && own.patch == c.patch
    })
}

fn branch_interval(req: &VersionReq) -> Option<Interval> {
    req.comparators
        .iter()
        .try_fold(Interval::full(), |acc, c| comparator_interval(c).map(|i| acc.intersect(i)))
}

fn flip(bound: Bound) -> Bound {
    match bound {
        Bound::Unbounded => Bound::Unbounded,
        Bound::Included(v) => Bound::Excluded(v),
        Bound::Excluded(v) => Bound::Included(v),
    }
}

fn next_major(major: u64) -> Bound {
    major
        .checked_add(1)
        .map_or(Bound::Unbounded, |m| Bound::Excluded(Version::new(m, 0, 0)))
}

fn next_minor(major: u64, minor: u64) -> Bound {
    minor
        .checked_add(1)
        .map_or(Bound::Unbounded, |m| Bound::Excluded(Version::new(major, m, 0)))
}

fn next_patch(major: u64, minor: u64, patch: u64) -> Bound {
    patch
        .checked_add(1)
        .map_or(Bound::Unbounded, |p| Bound::Excluded(Version::new(major, minor, p)))
}

/// Upper bound of the releases a comparator names at the precision it was
/// written with: `1` covers all of 1.x.y, `1.2` all of 1.2.y.
fn precision_ceiling(c: &Comparator, floor: &Version) -> Bound {
    match (c.minor, c.patch) {
        (None, _) => next_major(c.major),
        (Some(minor), None) => next_minor(c.major, minor),
        (Some(_), Some(_)) => Bound::Included(floor.clone()),
    }
}

fn caret_ceiling(c: &Comparator) -> Bound {
    match (c.major, c.minor, c.patch) {
        (0, Some(0), Some(patch)) => next_patch(0, 0, patch),
        (0, Some(minor), _) => next_minor(0, minor),
        (major, _, _) => next_major(major),
    }
}

fn comparator_interval(c: &Comparator) -> Option<Interval> {
    let floor = Version {
        major: c.major,
        minor: c.minor.unwrap_or(0),
        patch: c.patch.unwrap_or(0),
        pre: c.pre.clone(),
        build: BuildMetadata::EMPTY,
    };

    let interval = match c.op {
        Op::Exact | Op::Wildcard => Interval {
            upper: precision_ceiling(c, &floor),
            lower: Bound::Included(floor),
        },
        Op::Greater => match precision_ceiling(c, &floor) {
            Bound::Unbounded => return None,
            ceiling => Interval {
                lower: flip(ceiling),
                upper: Bound::Unbounded,
            },
        },
        Op::GreaterEq => Interval {
            lower: Bound::Included(floor),
            upper: Bound::Unbounded,
        },
        Op::Less => Interval {
            lower: Bound::Unbounded,
            upper: Bound::Excluded(floor),
        },
        Op::LessEq => Interval {
            lower: Bound::Unbounded,
            upper: precision_ceiling(c, &floor),
        },
        Op::Tilde => Interval {
            upper: match c.minor {
                Some(minor) => next_minor(c.major, minor),
                None => next_major(c.major),
            },
            lower: Bound::Included(floor),
        },
        Op::Caret => Interval {
            upper: caret_ceiling(c),
            lower: Bound::Included(floor),
        },
        _ => return None,
    };
    Some(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> Range {
        Range::parse(s).unwrap()
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn empty_text_is_unconstrained() {
        let r = range("");
        assert!(r.is_any());
        assert_eq!(r.to_string(), "");
        assert!(r.satisfies(&v("0.0.1")));
        assert!(r.satisfies(&v("99.1.0")));
    }

    #[test]
    fn bare_version_is_exact_not_caret() {
        let r = range("1.0.0 || 2.0.0");
        assert!(r.satisfies(&v("1.0.0")));
        assert!(r.satisfies(&v("2.0.0")));
        assert!(!r.satisfies(&v("1.5.0")));
        assert_eq!(r.to_string(), "1.0.0 || 2.0.0");
    }

    #[test]
    fn spaced_operators_and_commas() {
        assert_eq!(range("> 1.0.0  < 3.0.0").to_string(), ">1.0.0 <3.0.0");
        assert_eq!(range(">=1.0.0, <2.0.0").to_string(), ">=1.0.0 <2.0.0");
        assert_eq!(range("1.0.0||2.0.0||3.0.0").branches().len(), 3);
    }

    #[test]
    fn single_exact_keeps_operator() {
        let r = Range::exact(&v("1.2.3"));
        assert_eq!(r.to_string(), "=1.2.3");
        assert_eq!(range(&r.to_string()), r);
    }

    #[test]
    fn display_round_trips() {
        for text in [">1.0.0", "<3.0.0 >=1.0.0", "1.0.0 || 2.0.0 || >3.0.0", "^1.2", "~1.2.3", "1.*"] {
            let parsed = range(text);
            assert_eq!(range(&parsed.to_string()), parsed, "{text}");
        }
    }

    #[test]
    fn empty_branch_rejected() {
        assert!(matches!(
            Range::parse("1.0.0 || "),
            Err(Error::EmptyRangeBranch(_))
        ));
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(
            Range::parse(">>banana"),
            Err(Error::InvalidVersion { .. })
        ));
    }

    #[test]
    fn union_with_any_is_any() {
        assert!(range(">1.0.0").union(&Range::any()).is_any());
        assert_eq!(range("1.0.0").union(&range("1.0.0")).branches().len(), 2);
    }

    #[test]
    fn greater_ranges_nest() {
        assert!(range(">2.0.0").is_subset_of(&range(">1.0.0")));
        assert!(!range(">1.0.0").is_subset_of(&range(">2.0.0")));
    }

    #[test]
    fn less_ranges_nest() {
        assert!(range("<1.0.0").is_subset_of(&range("<3.0.0")));
        assert!(!range("<3.0.0").is_subset_of(&range("<1.0.0")));
    }

    #[test]
    fn disjoint_is_not_subset() {
        assert!(!range("<1.0.0").is_subset_of(&range(">2.0.0")));
        assert!(!range("1.0.0").is_subset_of(&range("2.0.0")));
    }

    #[test]
    fn points_inside_span() {
        assert!(range("1.0.0 || 2.0.0").is_subset_of(&range(">=1.0.0 <3.0.0")));
        assert!(!range("1.0.0 || 4.0.0").is_subset_of(&range(">=1.0.0 <3.0.0")));
    }

    #[test]
    fn adjacent_branches_cover_straddling_span() {
        let covering = range(">=1.0.0 <2.0.0 || >=2.0.0 <3.0.0");
        assert!(range(">=1.5.0 <2.5.0").is_subset_of(&covering));
        let gapped = range(">=1.0.0 <2.0.0 || >2.0.0 <3.0.0");
        assert!(!range(">=1.5.0 <2.5.0").is_subset_of(&gapped));
    }

    #[test]
    fn everything_is_subset_of_any() {
        assert!(range(">1.0.0").is_subset_of(&Range::any()));
        assert!(!Range::any().is_subset_of(&range(">1.0.0")));
        // 1.0.0-alpha is accepted by neither branch
        assert!(!Range::any().is_subset_of(&range("<1.0.0 || >=1.0.0")));
        assert!(range(">=1.0.0 <2.0.0").is_subset_of(&range("<1.5.0 || >=1.5.0")));
    }

    #[test]
    fn caret_and_tilde_intervals() {
        assert!(range("~1.2.3").is_subset_of(&range("^1.0.0")));
        assert!(!range("^1.0.0").is_subset_of(&range("~1.2.3")));
        assert!(range("^0.2.3").is_subset_of(&range(">=0.2.0 <0.3.0")));
        assert!(range("1.2.*").is_subset_of(&range("~1.2")));
    }

    #[test]
    fn partial_greater_means_next_release() {
        // >1.2 starts at 1.3.0
        assert!(range(">1.2").is_subset_of(&range(">=1.3.0")));
        assert!(range("<=1.2").is_subset_of(&range("<1.3.0")));
    }

    #[test]
    fn pre_release_needs_a_matching_tag() {
        let beta = range("=1.5.0-beta");
        assert!(beta.satisfies(&v("1.5.0-beta")));
        assert!(!range(">=1.0.0").satisfies(&v("1.5.0-beta")));
        assert!(!beta.is_subset_of(&range(">=1.0.0")));
        assert!(!range("1.5.0-beta || 1.6.0").is_subset_of(&range(">=1.0.0")));
        assert!(beta.is_subset_of(&range(">=1.5.0-alpha")));
        assert!(beta.is_subset_of(&range("<1.0.0 || >=1.5.0-alpha <2.0.0")));
        assert!(!beta.is_subset_of(&range(">=1.4.0-alpha")));
    }

    #[test]
    fn bare_partial_version_is_a_release_line() {
        let r = range("1.2");
        assert!(r.satisfies(&v("1.2.0")));
        assert!(r.satisfies(&v("1.2.5")));
        assert!(!r.satisfies(&v("1.3.0")));
        assert_eq!(r.to_string(), "=1.2");
        assert_eq!(range(&r.to_string()), r);

        let major = range("2 || 4");
        assert!(major.satisfies(&v("2.7.1")));
        assert!(!major.satisfies(&v("3.0.0")));
        assert!(range("1.2").is_subset_of(&range("~1.2")));
    }
}
