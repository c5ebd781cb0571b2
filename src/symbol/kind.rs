//! Role tags for graph nodes.
//!
//! Every symbol carries exactly one `ConstructKind`. Processes declare the
//! kinds they can serve as a `KindSet`, a fixed-width bit set, and
//! entrustment tests membership against it.

use serde::Serialize;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructKind {
    Agent,
    Subsystem,
    Buffer,
    Chunks,
    Features,
    Flow,
    Terminus,
    Updater,
}

impl ConstructKind {
    pub const ALL: [ConstructKind; 8] = [
        ConstructKind::Agent,
        ConstructKind::Subsystem,
        ConstructKind::Buffer,
        ConstructKind::Chunks,
        ConstructKind::Features,
        ConstructKind::Flow,
        ConstructKind::Terminus,
        ConstructKind::Updater,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConstructKind::Agent => "agent",
            ConstructKind::Subsystem => "subsystem",
            ConstructKind::Buffer => "buffer",
            ConstructKind::Chunks => "chunks",
            ConstructKind::Features => "features",
            ConstructKind::Flow => "flow",
            ConstructKind::Terminus => "terminus",
            ConstructKind::Updater => "updater",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstructKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConstructKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown construct kind: {}", s))
    }
}

/// Membership set over `ConstructKind`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u16);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);
    pub const ALL: KindSet = KindSet(0xff);

    /// Kinds that may name a structure.
    pub const CONTAINERS: KindSet = KindSet(0b0000_0011);

    /// Every leaf kind.
    pub const BASIC: KindSet = KindSet(0b1111_1100);

    /// Node pools and buffers: constructs that hold activations over nodes.
    pub const NODES: KindSet = KindSet(0b0001_1100);

    pub fn of(kinds: &[ConstructKind]) -> Self {
        kinds.iter().fold(KindSet::EMPTY, |acc, k| acc | *k)
    }

    pub fn contains(self, kind: ConstructKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ConstructKind> {
        ConstructKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl From<ConstructKind> for KindSet {
    fn from(kind: ConstructKind) -> Self {
        KindSet(kind.bit())
    }
}

impl BitOr for KindSet {
    type Output = KindSet;

    fn bitor(self, rhs: KindSet) -> KindSet {
        KindSet(self.0 | rhs.0)
    }
}

impl BitOr<ConstructKind> for KindSet {
    type Output = KindSet;

    fn bitor(self, rhs: ConstructKind) -> KindSet {
        KindSet(self.0 | rhs.bit())
    }
}

impl BitOr for ConstructKind {
    type Output = KindSet;

    fn bitor(self, rhs: ConstructKind) -> KindSet {
        KindSet(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<ConstructKind> for KindSet {
    fn bitor_assign(&mut self, rhs: ConstructKind) {
        self.0 |= rhs.bit();
    }
}

impl fmt::Debug for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_sets_partition_the_kinds() {
        for kind in ConstructKind::ALL {
            assert_ne!(
                KindSet::CONTAINERS.contains(kind),
                KindSet::BASIC.contains(kind),
                "{} must be either a container or a leaf kind",
                kind
            );
            assert!(KindSet::ALL.contains(kind));
            assert!(!KindSet::EMPTY.contains(kind));
        }
    }

    #[test]
    fn union_operators_agree() {
        let a = ConstructKind::Buffer | ConstructKind::Terminus;
        let mut b = KindSet::from(ConstructKind::Buffer);
        b |= ConstructKind::Terminus;

        assert_eq!(a, b);
        assert_eq!(a, KindSet::of(&[ConstructKind::Terminus, ConstructKind::Buffer]));
        assert!(!a.contains(ConstructKind::Flow));
    }

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in ConstructKind::ALL {
            assert_eq!(kind.as_str().parse::<ConstructKind>(), Ok(kind));
        }
        assert!("node_pool".parse::<ConstructKind>().is_err());
    }
}
