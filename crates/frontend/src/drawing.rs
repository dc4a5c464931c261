//! Undo bookkeeping for the polygon drawing tool.
//!
//! While a ring is being drawn, undo removes its last vertex. Once the
//! polygon is finished, every vertex drag records the ring as it was before
//! the drag, and undo restores those rings newest first.

use listing_map_shared::models::LngLat;

/// Oldest edits are dropped beyond this depth.
pub const MAX_UNDO: usize = 50;

/// What an undo step changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Undo {
    RemovedVertex,
    /// The finished polygon was put back to this ring.
    Restored(Vec<LngLat>),
    Nothing,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditHistory {
    edits: Vec<Vec<LngLat>>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the ring from before an edit. Edits that changed nothing are
    /// not recorded.
    pub fn record(&mut self, before: Vec<LngLat>, after: &[LngLat]) {
        if before == after {
            return;
        }
        if self.edits.len() >= MAX_UNDO {
            self.edits.remove(0);
        }
        self.edits.push(before);
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }

    pub fn depth(&self) -> usize {
        self.edits.len()
    }

    pub fn can_undo(&self, drawing: bool, draw_ring: &[LngLat], polygon: Option<&[LngLat]>) -> bool {
        if drawing {
            !draw_ring.is_empty()
        } else {
            polygon.is_some() && !self.edits.is_empty()
        }
    }

    pub fn undo(
        &mut self,
        drawing: bool,
        draw_ring: &mut Vec<LngLat>,
        polygon: &mut Option<Vec<LngLat>>,
    ) -> Undo {
        if drawing {
            return match draw_ring.pop() {
                Some(_) => Undo::RemovedVertex,
                None => Undo::Nothing,
            };
        }
        let Some(current) = polygon.as_mut() else {
            return Undo::Nothing;
        };
        match self.edits.pop() {
            Some(previous) => {
                *current = previous.clone();
                Undo::Restored(previous)
            }
            None => Undo::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize) -> Vec<LngLat> {
        (0..n).map(|i| LngLat::new(i as f64, -(i as f64))).collect()
    }

    #[test]
    fn test_undo_while_drawing_pops_last_vertex() {
        let mut history = EditHistory::new();
        let mut draw_ring = ring(3);
        let mut polygon = None;

        assert!(history.can_undo(true, &draw_ring, None));
        assert_eq!(history.undo(true, &mut draw_ring, &mut polygon), Undo::RemovedVertex);
        assert_eq!(draw_ring, ring(2));
        history.undo(true, &mut draw_ring, &mut polygon);
        history.undo(true, &mut draw_ring, &mut polygon);
        assert!(draw_ring.is_empty());
        assert!(!history.can_undo(true, &draw_ring, None));
        assert_eq!(history.undo(true, &mut draw_ring, &mut polygon), Undo::Nothing);
    }

    #[test]
    fn test_undo_restores_edited_polygon_newest_first() {
        let original = ring(4);
        let mut moved_once = original.clone();
        moved_once[1] = LngLat::new(9.0, 9.0);
        let mut moved_twice = moved_once.clone();
        moved_twice[2] = LngLat::new(7.0, 7.0);

        let mut history = EditHistory::new();
        history.record(original.clone(), &moved_once);
        history.record(moved_once.clone(), &moved_twice);
        assert_eq!(history.depth(), 2);

        let mut draw_ring = Vec::new();
        let mut polygon = Some(moved_twice);
        assert_eq!(
            history.undo(false, &mut draw_ring, &mut polygon),
            Undo::Restored(moved_once.clone())
        );
        assert_eq!(polygon.as_deref(), Some(moved_once.as_slice()));
        assert_eq!(
            history.undo(false, &mut draw_ring, &mut polygon),
            Undo::Restored(original.clone())
        );
        assert_eq!(polygon, Some(original));
        assert_eq!(history.undo(false, &mut draw_ring, &mut polygon), Undo::Nothing);
    }

    #[test]
    fn test_unchanged_edit_is_not_recorded() {
        let mut history = EditHistory::new();
        history.record(ring(3), &ring(3));
        assert_eq!(history.depth(), 0);
        assert!(!history.can_undo(false, &[], Some(&ring(3))));
    }

    #[test]
    fn test_undo_without_polygon_does_nothing() {
        let mut history = EditHistory::new();
        history.record(ring(3), &ring(4));
        let mut polygon = None;
        assert_eq!(history.undo(false, &mut Vec::new(), &mut polygon), Undo::Nothing);
        assert!(polygon.is_none());
        assert_eq!(history.depth(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = EditHistory::new();
        for i in 0..MAX_UNDO + 5 {
            history.record(ring(i + 1), &ring(i + 2));
        }
        assert_eq!(history.depth(), MAX_UNDO);

        let mut polygon = Some(ring(1));
        assert_eq!(
            history.undo(false, &mut Vec::new(), &mut polygon),
            Undo::Restored(ring(MAX_UNDO + 5))
        );
    }
}
