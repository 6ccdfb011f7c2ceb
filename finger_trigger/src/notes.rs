//! Note names for each finger slot.

use crate::hand::{FingerId, FingerKey, Hand};

/// Label used for a slot with no note bound to it.
pub const UNKNOWN_NOTE: &str = "Unknown";

/// One optional note name per [`FingerKey`].
///
/// The default table lays a C-major scale across both hands: the left
/// pinky is Do and the notes ascend towards the left thumb, then continue
/// from the right thumb out to the right pinky.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteMap {
    names: [Option<String>; FingerKey::COUNT],
}

impl NoteMap {
    /// A map with nothing bound; every lookup yields [`UNKNOWN_NOTE`].
    pub fn empty() -> Self {
        NoteMap { names: Default::default() }
    }

    pub fn bind(&mut self, key: FingerKey, name: impl Into<String>) {
        self.names[key.index()] = Some(name.into());
    }

    pub fn unbind(&mut self, key: FingerKey) {
        self.names[key.index()] = None;
    }

    /// Note name for `key`, or [`UNKNOWN_NOTE`] when unbound.
    pub fn name(&self, key: FingerKey) -> &str {
        self.names[key.index()].as_deref().unwrap_or(UNKNOWN_NOTE)
    }

    pub fn is_bound(&self, key: FingerKey) -> bool {
        self.names[key.index()].is_some()
    }
}

impl Default for NoteMap {
    fn default() -> Self {
        use FingerId::*;
        use Hand::*;

        let table = [
            (Left,  Pinky,  "Do (C)"),
            (Left,  Ring,   "Re (D)"),
            (Left,  Middle, "Mi (E)"),
            (Left,  Index,  "Fa (F)"),
            (Left,  Thumb,  "Sol (G)"),
            (Right, Thumb,  "La (A)"),
            (Right, Index,  "Ti (B)"),
            (Right, Middle, "Do' (C')"),
            (Right, Ring,   "Re' (D')"),
            (Right, Pinky,  "Mi' (E')"),
        ];

        let mut map = NoteMap::empty();
        for (hand, finger, name) in table {
            map.bind(FingerKey::new(hand, finger), name);
        }
        map
    }
}
