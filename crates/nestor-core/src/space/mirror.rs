use std::ops::RangeInclusive;

use crate::error::Error;

/// One-directional alias from `source` onto a range of equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRule {
    source: RangeInclusive<u16>,
    target_start: u16,
}

impl MirrorRule {
    pub fn new(source: RangeInclusive<u16>, target: RangeInclusive<u16>) -> Result<Self, Error> {
        let source_len = range_len(&source);
        let target_len = range_len(&target);
        if source_len != target_len {
            return Err(Error::MirrorLengthMismatch {
                source_len,
                target_len,
            });
        }

        Ok(Self {
            target_start: *target.start(),
            source,
        })
    }

    pub fn source(&self) -> &RangeInclusive<u16> {
        &self.source
    }

    pub fn target(&self) -> RangeInclusive<u16> {
        let len = range_len(&self.source) as u16;
        self.target_start..=self.target_start.wrapping_add(len.wrapping_sub(1))
    }

    /// The aliased address for `addr`, if `addr` lies in the source range.
    pub fn resolve(&self, addr: u16) -> Option<u16> {
        self.source
            .contains(&addr)
            .then(|| self.target_start.wrapping_add(addr - self.source.start()))
    }
}

/// Ordered collection of [`MirrorRule`]s. Insertion order is evaluation order.
#[derive(Debug, Clone, Default)]
pub struct MirrorTable {
    rules: Vec<MirrorRule>,
}

impl MirrorTable {
    pub fn push(&mut self, rule: MirrorRule) {
        self.rules.push(rule);
    }

    pub(crate) fn len(&self) -> usize {
        self.rules.len()
    }

    /// Every address a write to `addr` must also land on.
    pub fn targets(&self, addr: u16) -> impl Iterator<Item = u16> + '_ {
        self.rules.iter().filter_map(move |rule| rule.resolve(addr))
    }
}

fn range_len(range: &RangeInclusive<u16>) -> usize {
    if range.is_empty() {
        0
    } else {
        (*range.end() - *range.start()) as usize + 1
    }
}
