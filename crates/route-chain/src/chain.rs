//! Ordered reconstruction and splicing of a road's segment chain.
//!
//! Rows are stored unordered; [`Chain`] holds them as an ordered arena whose
//! first entry is the head. Splicing never mutates the source chain, so the
//! active chain stays untouched while a proposal is prepared.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{ChainError, RoadToSegment, SegmentHash};

/// One position in an ordered chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    /// Segment at this position.
    pub segment_hash: SegmentHash,
    /// User whose stop lies at the end of the segment.
    pub alighting_user_id: Option<Uuid>,
}

/// The two halves produced by splitting a segment at a passenger stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPair {
    first: SegmentHash,
    second: SegmentHash,
}

impl SplitPair {
    /// Pair the sequence-1 and sequence-2 replacements.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::DegenerateSplit`] when both halves share a hash.
    pub fn new(first: SegmentHash, second: SegmentHash) -> Result<Self, ChainError> {
        if first == second {
            return Err(ChainError::DegenerateSplit {
                segment_hash: first,
            });
        }
        Ok(Self { first, second })
    }

    /// Segment ending at the passenger's stop.
    #[must_use]
    pub const fn first(&self) -> &SegmentHash {
        &self.first
    }

    /// Segment continuing after the passenger's stop.
    #[must_use]
    pub const fn second(&self) -> &SegmentHash {
        &self.second
    }
}

/// A validated, ordered chain of segments for one road.
///
/// A chain always holds at least one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    road_id: Uuid,
    links: Vec<ChainLink>,
}

impl Chain {
    /// Reconstruct the head-to-tail order from unordered rows.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] when the rows are empty, belong to another
    /// road, repeat a hash, have zero or several heads, link to missing or
    /// inconsistent neighbours, or leave rows unreachable from the head.
    pub fn from_edges<I>(road_id: Uuid, edges: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = RoadToSegment>,
    {
        let mut remaining: HashMap<SegmentHash, RoadToSegment> = HashMap::new();
        let mut heads = Vec::new();
        for row in edges {
            if row.road_id != road_id {
                return Err(ChainError::ForeignRow {
                    expected: road_id,
                    found: row.road_id,
                    segment_hash: row.segment_hash,
                });
            }
            if row.is_head() {
                heads.push(row.segment_hash.clone());
            }
            let key = row.segment_hash.clone();
            if remaining.insert(key.clone(), row).is_some() {
                return Err(ChainError::DuplicateSegment { segment_hash: key });
            }
        }

        if remaining.is_empty() {
            return Err(ChainError::Empty { road_id });
        }
        let head_hash = match heads.as_slice() {
            [] => return Err(ChainError::MissingHead { road_id }),
            [only] => only.clone(),
            several => {
                return Err(ChainError::MultipleHeads {
                    road_id,
                    count: several.len(),
                });
            }
        };

        let total = remaining.len();
        let mut links = Vec::with_capacity(total);
        let mut visited = HashSet::with_capacity(total);
        let mut current = remaining
            .remove(&head_hash)
            .ok_or(ChainError::MissingHead { road_id })?;

        loop {
            let from = current.segment_hash.clone();
            let next = current.next_segment_hash.take();
            visited.insert(from.clone());
            links.push(ChainLink {
                segment_hash: current.segment_hash,
                alighting_user_id: current.alighting_user_id,
            });

            let Some(next_hash) = next else { break };
            let Some(row) = remaining.remove(&next_hash) else {
                if visited.contains(&next_hash) {
                    return Err(ChainError::InconsistentLink {
                        segment_hash: next_hash,
                        expected_previous: from,
                    });
                }
                return Err(ChainError::BrokenLink {
                    from,
                    to: next_hash,
                });
            };
            if row.previous_segment_hash.as_ref() != Some(&from) {
                return Err(ChainError::InconsistentLink {
                    segment_hash: row.segment_hash,
                    expected_previous: from,
                });
            }
            current = row;
        }

        if !remaining.is_empty() {
            return Err(ChainError::Unreachable {
                road_id,
                count: remaining.len(),
            });
        }

        Ok(Self { road_id, links })
    }

    /// Build a chain holding a single segment.
    #[must_use]
    pub fn single(road_id: Uuid, segment_hash: SegmentHash) -> Self {
        Self {
            road_id,
            links: vec![ChainLink {
                segment_hash,
                alighting_user_id: None,
            }],
        }
    }

    /// Road this chain belongs to.
    #[must_use]
    pub const fn road_id(&self) -> Uuid {
        self.road_id
    }

    /// Number of segments in the chain.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.links.len()
    }

    /// Always `false` for a constructed chain.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Links ordered from head to tail.
    #[must_use]
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    /// Iterate links from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &ChainLink> {
        self.links.iter()
    }

    /// Iterate segment hashes from head to tail.
    pub fn hashes(&self) -> impl Iterator<Item = &SegmentHash> {
        self.links.iter().map(|link| &link.segment_hash)
    }

    /// First segment of the road.
    #[must_use]
    pub fn head(&self) -> Option<&ChainLink> {
        self.links.first()
    }

    /// Last segment of the road.
    #[must_use]
    pub fn tail(&self) -> Option<&ChainLink> {
        self.links.last()
    }

    /// Whether the chain contains `segment_hash`.
    #[must_use]
    pub fn contains(&self, segment_hash: &SegmentHash) -> bool {
        self.links
            .iter()
            .any(|link| &link.segment_hash == segment_hash)
    }

    /// Users with a stop on this chain, in travel order, without repeats.
    #[must_use]
    pub fn alighting_users(&self) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        self.links
            .iter()
            .filter_map(|link| link.alighting_user_id)
            .filter(|user| seen.insert(*user))
            .collect()
    }

    /// Replace `target` with the two halves of `split`.
    ///
    /// The passenger's stop is recorded on the first half; the target's
    /// former alighting user moves to the second half. The receiver is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::SegmentNotInChain`] when `target` is absent and
    /// [`ChainError::DuplicateSegment`] when either half already occurs in
    /// the chain.
    pub fn splice(
        &self,
        target: &SegmentHash,
        split: &SplitPair,
        passenger_id: Uuid,
    ) -> Result<Self, ChainError> {
        if !self.contains(target) {
            return Err(ChainError::SegmentNotInChain {
                segment_hash: target.clone(),
            });
        }
        for half in [split.first(), split.second()] {
            if self.contains(half) {
                return Err(ChainError::DuplicateSegment {
                    segment_hash: half.clone(),
                });
            }
        }

        let mut links = Vec::with_capacity(self.links.len().saturating_add(1));
        for link in &self.links {
            if &link.segment_hash == target {
                links.push(ChainLink {
                    segment_hash: split.first().clone(),
                    alighting_user_id: Some(passenger_id),
                });
                links.push(ChainLink {
                    segment_hash: split.second().clone(),
                    alighting_user_id: link.alighting_user_id,
                });
            } else {
                links.push(link.clone());
            }
        }

        Ok(Self {
            road_id: self.road_id,
            links,
        })
    }

    /// Flatten the chain back into linked rows.
    #[must_use]
    pub fn to_edges(&self) -> Vec<RoadToSegment> {
        let mut previous: Option<&SegmentHash> = None;
        let mut rows = Vec::with_capacity(self.links.len());
        for (position, link) in self.links.iter().enumerate() {
            let next = self
                .links
                .get(position.saturating_add(1))
                .map(|following| following.segment_hash.clone());
            rows.push(RoadToSegment {
                road_id: self.road_id,
                segment_hash: link.segment_hash.clone(),
                previous_segment_hash: previous.cloned(),
                next_segment_hash: next,
                alighting_user_id: link.alighting_user_id,
            });
            previous = Some(&link.segment_hash);
        }
        rows
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a ChainLink;
    type IntoIter = std::slice::Iter<'a, ChainLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
