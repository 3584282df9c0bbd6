// Note creation, removal and movement.
//
// A hold or roll is stored as a chain of segments in one column: a Begin at
// the head, one Intermediate at the start of every whole bucket strictly
// between head and tail, and an End at the tail. Every segment carries the
// full span so any of them can find the others.

use log::{debug, warn};

use crate::chart::Chart;
use crate::handle::EntityId;
use crate::note::{Note, NoteKind, NoteType, SustainKind, SustainPart, TimeSpan};
use crate::selection::Selection;
use crate::{Column, Time};

impl Chart {
    pub fn is_cell_occupied(&self, time: Time, column: Column) -> bool {
        self.find_note(time, column).is_some()
    }

    /// Note at exactly `time` in `column`.
    pub fn find_note(&self, time: Time, column: Column) -> Option<&Note> {
        self.store.get(time)?.find_note(time, column)
    }

    /// Resolve a handle to its note and column.
    pub fn note(&self, id: EntityId) -> Option<(Column, &Note)> {
        let bucket = self.store.get_by_index(self.handles.locate(id)?)?;
        bucket.all_notes().find(|(_, note)| note.id == id)
    }

    /// Insert a single note (tap, mine, lift or fake).
    ///
    /// Returns `None` when the type is a sustain segment, the column is out
    /// of range or the cell is taken.
    pub fn insert_note(
        &mut self,
        time: Time,
        column: Column,
        note_type: NoteType,
        beat_snap: Option<u32>,
    ) -> Option<EntityId> {
        let Some(kind) = NoteKind::single(note_type) else {
            debug!("{note_type:?} can only be created through a sustain insert");
            return None;
        };
        if !self.accepts_column(column) {
            debug!("column {column} outside of {} keys", self.key_count());
            return None;
        }
        if self.is_cell_occupied(time, column) {
            return None;
        }
        let note = Note::new(time, kind).with_beat_snap(beat_snap);
        Some(self.edit_batch(|chart| chart.place_note(column, note)))
    }

    pub fn insert_hold(
        &mut self,
        begin: Time,
        end: Time,
        column: Column,
        begin_snap: Option<u32>,
        end_snap: Option<u32>,
    ) -> Option<EntityId> {
        self.insert_sustain(SustainKind::Hold, begin, end, column, begin_snap, end_snap)
    }

    pub fn insert_roll(
        &mut self,
        begin: Time,
        end: Time,
        column: Column,
        begin_snap: Option<u32>,
        end_snap: Option<u32>,
    ) -> Option<EntityId> {
        self.insert_sustain(SustainKind::Roll, begin, end, column, begin_snap, end_snap)
    }

    /// Insert a hold or roll and return the handle of its head.
    ///
    /// A zero-length span degrades to a tap. Reversed bounds are swapped.
    /// Nothing is written if any segment cell is already taken.
    pub fn insert_sustain(
        &mut self,
        sustain: SustainKind,
        begin: Time,
        end: Time,
        column: Column,
        begin_snap: Option<u32>,
        end_snap: Option<u32>,
    ) -> Option<EntityId> {
        if begin == end {
            return self.insert_note(begin, column, NoteType::Tap, begin_snap);
        }
        let (begin, end, begin_snap, end_snap) = if begin > end {
            (end, begin, end_snap, begin_snap)
        } else {
            (begin, end, begin_snap, end_snap)
        };
        if !self.accepts_column(column) {
            debug!("column {column} outside of {} keys", self.key_count());
            return None;
        }

        let span = TimeSpan::new(begin, end);
        let cells = self.sustain_cells(span);
        if cells.iter().any(|&time| self.is_cell_occupied(time, column)) {
            debug!("{sustain:?} {begin}..{end} blocked in column {column}");
            return None;
        }

        Some(self.edit_batch(|chart| chart.write_sustain(sustain, span, column, &cells, begin_snap, end_snap)))
    }

    fn write_sustain(
        &mut self,
        sustain: SustainKind,
        span: TimeSpan,
        column: Column,
        cells: &[Time],
        begin_snap: Option<u32>,
        end_snap: Option<u32>,
    ) -> EntityId {
        let segment = |time: Time, part: SustainPart| {
            Note::new(time, NoteKind::Sustain { sustain, part, span })
        };
        let head = self.place_note(
            column,
            segment(span.begin, SustainPart::Begin)
                .with_beat_snap(begin_snap)
                .with_end_snap(end_snap),
        );
        for &time in cells.iter().filter(|&&t| t != span.begin && t != span.end) {
            self.place_note(column, segment(time, SustainPart::Intermediate));
        }
        self.place_note(
            column,
            segment(span.end, SustainPart::End).with_beat_snap(end_snap),
        );
        head
    }

    /// Segment times of a sustain: head, the start of every whole bucket
    /// strictly between head and tail, then tail.
    pub fn sustain_cells(&self, span: TimeSpan) -> Vec<Time> {
        let width = self.store.width();
        let mut cells = vec![span.begin];
        let mut time = self.store.bucket_time(span.begin) + width;
        let last = self.store.bucket_time(span.end) - width;
        while time <= last {
            cells.push(time);
            time += width;
        }
        if span.end != span.begin {
            cells.push(span.end);
        }
        cells
    }

    /// Remove the note at `time`/`column`. Removing any segment of a sustain
    /// removes the whole chain.
    pub fn remove_note(&mut self, time: Time, column: Column) -> bool {
        let Some(note) = self.find_note(time, column).copied() else {
            return false;
        };
        self.edit_batch(|chart| match note.kind {
            NoteKind::Sustain { sustain, span, .. } => {
                chart.remove_sustain_chain(sustain, span, column);
            }
            _ => {
                chart.take_note(time, column);
            }
        });
        true
    }

    fn remove_sustain_chain(&mut self, sustain: SustainKind, span: TimeSpan, column: Column) {
        for time in self.sustain_cells(span) {
            let belongs = self
                .find_note(time, column)
                .is_some_and(|note| is_segment_of(note, sustain, span));
            if belongs {
                self.take_note(time, column);
            }
        }
    }

    /// Move a note to another cell.
    ///
    /// Single notes keep their kind and fail on an occupied target. Moving a
    /// sustain head or tail rebuilds the chain with the moved end, keeping
    /// the snap of the end that stays put. Intermediate segments cannot be
    /// moved. The moved note (or sustain head) keeps its handle, which is
    /// returned.
    pub fn move_note(
        &mut self,
        from_time: Time,
        to_time: Time,
        from_column: Column,
        to_column: Column,
        new_snap: Option<u32>,
    ) -> Option<EntityId> {
        let note = self.find_note(from_time, from_column).copied()?;
        if !self.accepts_column(to_column) {
            debug!("column {to_column} outside of {} keys", self.key_count());
            return None;
        }

        match note.kind {
            NoteKind::Sustain { sustain, part, span } => {
                self.move_sustain(sustain, part, span, from_column, to_time, to_column, new_snap)
            }
            kind => {
                let same_cell = from_time == to_time && from_column == to_column;
                if !same_cell && self.is_cell_occupied(to_time, to_column) {
                    return None;
                }
                let mut moved = Note::new(to_time, kind).with_beat_snap(new_snap);
                moved.id = note.id;
                Some(self.edit_batch(|chart| {
                    chart.take_note(from_time, from_column);
                    chart.place_note(to_column, moved)
                }))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn move_sustain(
        &mut self,
        sustain: SustainKind,
        part: SustainPart,
        span: TimeSpan,
        from_column: Column,
        to_time: Time,
        to_column: Column,
        new_snap: Option<u32>,
    ) -> Option<EntityId> {
        let head = self.find_note(span.begin, from_column).copied();
        let head_id = head.map_or(EntityId::NONE, |n| n.id);
        let head_snap = head.and_then(|n| n.beat_snap);
        let tail_snap = self.find_note(span.end, from_column).and_then(|n| n.beat_snap);
        let (begin, end, begin_snap, end_snap) = match part {
            SustainPart::Begin => (to_time, span.end, new_snap, tail_snap),
            SustainPart::End => (span.begin, to_time, head_snap, new_snap),
            SustainPart::Intermediate => {
                debug!("intermediate segment at {} cannot be moved", span.begin);
                return None;
            }
        };

        let target = TimeSpan::new(begin.min(end), begin.max(end));
        let blocked = self.sustain_cells(target).into_iter().any(|time| {
            self.find_note(time, to_column).is_some_and(|note| {
                !(to_column == from_column && is_segment_of(note, sustain, span))
            })
        });
        if blocked {
            debug!("{sustain:?} move to {begin}..{end} blocked in column {to_column}");
            return None;
        }

        self.edit_batch(|chart| {
            chart.remove_sustain_chain(sustain, span, from_column);
            let placed = chart.insert_sustain(sustain, begin, end, to_column, begin_snap, end_snap)?;
            if !head_id.is_assigned() {
                return Some(placed);
            }
            chart.reassign_note_id(placed, head_id)?;
            Some(head_id)
        })
    }

    /// Give the stored note `from` the handle `to`.
    fn reassign_note_id(&mut self, from: EntityId, to: EntityId) -> Option<()> {
        let index = self.handles.locate(from)?;
        let note = self
            .edit_bucket(index)
            .notes
            .values_mut()
            .flatten()
            .find(|note| note.id == from)?;
        note.id = to;
        self.handles.release(from);
        self.handles.relocate(to, index);
        Some(())
    }

    /// Insert a head-level note as carried by a selection. Sustain heads are
    /// expanded to their full chain. Non-head segments are refused.
    pub fn insert_head(&mut self, column: Column, note: &Note) -> Option<EntityId> {
        match note.kind {
            NoteKind::Sustain {
                sustain,
                part: SustainPart::Begin,
                span,
            } => self.insert_sustain(sustain, span.begin, span.end, column, note.beat_snap, note.end_snap),
            NoteKind::Sustain { .. } => None,
            kind => self.insert_note(note.time, column, kind.note_type(), note.beat_snap),
        }
    }

    /// Insert many head-level notes as one undo step. Notes landing on taken
    /// cells are dropped. Returns how many were placed.
    pub fn bulk_insert_notes(&mut self, notes: &[(Column, Note)]) -> usize {
        let placed = self.edit_batch(|chart| {
            let mut placed = 0;
            for (column, note) in notes {
                if chart.insert_head(*column, note).is_some() {
                    placed += 1;
                }
            }
            placed
        });
        if placed < notes.len() {
            warn!("{} of {} note(s) collided and were dropped", notes.len() - placed, notes.len());
        }
        placed
    }

    /// Remove every note of `selection` as one undo step and empty it.
    pub fn bulk_remove_notes(&mut self, selection: &mut Selection) -> usize {
        let Some((min, max)) = selection.bounds() else {
            return 0;
        };
        let removed = self.edit_batch(|chart| {
            chart.register_history_ranged(min, max);
            let mut removed = 0;
            for (column, note) in selection.iter() {
                if chart.remove_note(note.time, column) {
                    removed += 1;
                }
            }
            chart.notify_range(min, max);
            removed
        });
        selection.clear();
        removed
    }

    /// Store a note, allocating a handle unless it already carries one.
    pub(crate) fn place_note(&mut self, column: Column, mut note: Note) -> EntityId {
        let index = self.store.index_of(note.time);
        if note.id.is_assigned() {
            self.handles.relocate(note.id, index);
        } else {
            note.id = self.handles.allocate(index);
        }
        let id = note.id;
        self.edit_bucket(index).insert_note(column, note);
        id
    }

    pub(crate) fn take_note(&mut self, time: Time, column: Column) -> Option<Note> {
        self.find_note(time, column)?;
        let index = self.store.index_of(time);
        let note = self.edit_bucket(index).take_note(time, column)?;
        self.handles.release(note.id);
        Some(note)
    }
}

fn is_segment_of(note: &Note, sustain: SustainKind, span: TimeSpan) -> bool {
    note.sustain() == Some(sustain) && note.span() == Some(span)
}
