//! Contact events and overlap tracking
//!
//! A contact exists for every pair of fixtures (on different bodies) whose
//! shapes overlap. The world reports the onset and the end of each contact
//! once, never once per frame of continued overlap.

use std::collections::BTreeSet;

use super::body::{BodyHandle, FixtureHandle};
use super::world::World;

/// An overlap between two fixtures on different bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub fixture_a: FixtureHandle,
    pub fixture_b: FixtureHandle,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Either fixture is a sensor
    pub is_sensor: bool,
}

impl Contact {
    /// The body on the other side of the contact from `body`
    pub fn other_body(&self, body: BodyHandle) -> Option<BodyHandle> {
        if body == self.body_a {
            Some(self.body_b)
        } else if body == self.body_b {
            Some(self.body_a)
        } else {
            None
        }
    }

    pub fn involves(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }
}

/// Observer of contact begin/end, invoked synchronously inside `World::step`
///
/// The world is handed back mutably so a listener may create or destroy
/// bodies. Events still pending for a destroyed body are dropped.
pub trait ContactListener {
    fn begin_contact(&mut self, world: &mut World, contact: &Contact);

    fn end_contact(&mut self, _world: &mut World, _contact: &Contact) {}
}

/// Normalized fixture pair (lower handle first)
pub(crate) type PairKey = (FixtureHandle, FixtureHandle);

#[inline]
pub(crate) fn pair_key(a: FixtureHandle, b: FixtureHandle) -> PairKey {
    if a <= b { (a, b) } else { (b, a) }
}

/// Pairs that transitioned during one step
#[derive(Debug, Default)]
pub(crate) struct ContactTransitions {
    pub began: Vec<PairKey>,
    pub ended: Vec<PairKey>,
}

/// Overlapping pairs as of the last completed step
#[derive(Debug, Default)]
pub(crate) struct ContactSet {
    touching: BTreeSet<PairKey>,
}

impl ContactSet {
    /// Replace the overlap set with this step's, returning the transitions
    pub fn update(&mut self, current: BTreeSet<PairKey>) -> ContactTransitions {
        let began = current.difference(&self.touching).copied().collect();
        let ended = self.touching.difference(&current).copied().collect();
        self.touching = current;
        ContactTransitions { began, ended }
    }

    pub fn contains(&self, a: FixtureHandle, b: FixtureHandle) -> bool {
        self.touching.contains(&pair_key(a, b))
    }

    /// Forget every pair involving `fixture` without reporting an end
    pub fn forget_fixture(&mut self, fixture: FixtureHandle) {
        self.touching.retain(|&(a, b)| a != fixture && b != fixture);
    }

    pub fn len(&self) -> usize {
        self.touching.len()
    }

    pub fn clear(&mut self) {
        self.touching.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn handles(n: usize) -> Vec<FixtureHandle> {
        let mut map: SlotMap<FixtureHandle, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        let h = handles(2);
        assert_eq!(pair_key(h[0], h[1]), pair_key(h[1], h[0]));
    }

    #[test]
    fn test_transitions_report_onset_once() {
        let h = handles(3);
        let mut set = ContactSet::default();

        let step1: BTreeSet<_> = [pair_key(h[0], h[1])].into();
        let t = set.update(step1.clone());
        assert_eq!(t.began, vec![pair_key(h[0], h[1])]);
        assert!(t.ended.is_empty());

        // Same overlap again: nothing new
        let t = set.update(step1);
        assert!(t.began.is_empty());
        assert!(t.ended.is_empty());

        let step3: BTreeSet<_> = [pair_key(h[1], h[2])].into();
        let t = set.update(step3);
        assert_eq!(t.began, vec![pair_key(h[1], h[2])]);
        assert_eq!(t.ended, vec![pair_key(h[0], h[1])]);
    }

    #[test]
    fn test_forget_fixture_drops_pairs_silently() {
        let h = handles(3);
        let mut set = ContactSet::default();
        set.update([pair_key(h[0], h[1]), pair_key(h[1], h[2])].into());
        set.forget_fixture(h[1]);
        assert_eq!(set.len(), 0);
        let t = set.update(BTreeSet::new());
        assert!(t.ended.is_empty());
    }
}
