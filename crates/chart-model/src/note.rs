// Note entities: flat type tags and the tagged kind stored in buckets.

use serde::{Deserialize, Serialize};

use crate::Time;
use crate::handle::EntityId;

/// Flat tag of every note variant, as seen by renderers and format writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoteType {
    Tap,
    HoldBegin,
    HoldIntermediate,
    HoldEnd,
    RollBegin,
    RollIntermediate,
    RollEnd,
    Mine,
    Lift,
    Fake,
}

impl NoteType {
    /// Whether this tag describes a single, non-ranged note.
    pub fn is_single(self) -> bool {
        matches!(self, Self::Tap | Self::Mine | Self::Lift | Self::Fake)
    }
}

/// Flavor of a sustained note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SustainKind {
    Hold,
    Roll,
}

/// Which segment of a sustained note an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SustainPart {
    Begin,
    /// One per whole bucket strictly between begin and end
    Intermediate,
    End,
}

/// Begin/end of a sustained note, copied onto every one of its segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    pub begin: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn new(begin: Time, end: Time) -> Self {
        Self { begin, end }
    }

    pub fn length(&self) -> Time {
        self.end - self.begin
    }

    pub fn contains(&self, time: Time) -> bool {
        self.begin <= time && time <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    Tap,
    Mine,
    Lift,
    Fake,
    Sustain {
        sustain: SustainKind,
        part: SustainPart,
        span: TimeSpan,
    },
}

impl NoteKind {
    /// Single-note kind for a flat tag, `None` for sustain segments.
    pub fn single(note_type: NoteType) -> Option<Self> {
        match note_type {
            NoteType::Tap => Some(Self::Tap),
            NoteType::Mine => Some(Self::Mine),
            NoteType::Lift => Some(Self::Lift),
            NoteType::Fake => Some(Self::Fake),
            _ => None,
        }
    }

    pub fn note_type(&self) -> NoteType {
        match *self {
            Self::Tap => NoteType::Tap,
            Self::Mine => NoteType::Mine,
            Self::Lift => NoteType::Lift,
            Self::Fake => NoteType::Fake,
            Self::Sustain { sustain, part, .. } => match (sustain, part) {
                (SustainKind::Hold, SustainPart::Begin) => NoteType::HoldBegin,
                (SustainKind::Hold, SustainPart::Intermediate) => NoteType::HoldIntermediate,
                (SustainKind::Hold, SustainPart::End) => NoteType::HoldEnd,
                (SustainKind::Roll, SustainPart::Begin) => NoteType::RollBegin,
                (SustainKind::Roll, SustainPart::Intermediate) => NoteType::RollIntermediate,
                (SustainKind::Roll, SustainPart::End) => NoteType::RollEnd,
            },
        }
    }
}

/// A single note entity living in one bucket/column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub(crate) id: EntityId,
    /// Time in milliseconds
    pub time: Time,
    pub kind: NoteKind,
    /// Musical subdivision the note was placed on (`None` = unspecified)
    pub beat_snap: Option<u32>,
    /// Snap of the tail segment, kept on sustain heads so head-level copies
    /// can rebuild the whole chain.
    #[serde(default)]
    pub end_snap: Option<u32>,
}

impl Note {
    pub fn new(time: Time, kind: NoteKind) -> Self {
        Self {
            id: EntityId::NONE,
            time,
            kind,
            beat_snap: None,
            end_snap: None,
        }
    }

    pub fn tap(time: Time) -> Self {
        Self::new(time, NoteKind::Tap)
    }

    /// Head segment of a hold or roll spanning `begin..=end`.
    pub fn sustain_head(sustain: SustainKind, begin: Time, end: Time) -> Self {
        Self::new(
            begin,
            NoteKind::Sustain {
                sustain,
                part: SustainPart::Begin,
                span: TimeSpan::new(begin, end),
            },
        )
    }

    pub fn with_beat_snap(mut self, beat_snap: Option<u32>) -> Self {
        self.beat_snap = beat_snap;
        self
    }

    pub fn with_end_snap(mut self, end_snap: Option<u32>) -> Self {
        self.end_snap = end_snap;
        self
    }

    /// Copy with both head and tail snaps cleared.
    pub fn without_snaps(self) -> Self {
        self.with_beat_snap(None).with_end_snap(None)
    }

    /// Copy placed at `begin`. Sustains also get their span set to
    /// `begin..=end`; single notes ignore `end`.
    pub fn respanned(mut self, begin: Time, end: Time) -> Self {
        self.time = begin;
        if let NoteKind::Sustain { span, .. } = &mut self.kind {
            *span = TimeSpan::new(begin, end);
        }
        self
    }

    pub fn shifted(self, delta: Time) -> Self {
        let end = self.end_time() + delta;
        self.respanned(self.time + delta, end)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn note_type(&self) -> NoteType {
        self.kind.note_type()
    }

    pub fn span(&self) -> Option<TimeSpan> {
        match self.kind {
            NoteKind::Sustain { span, .. } => Some(span),
            _ => None,
        }
    }

    pub fn sustain(&self) -> Option<SustainKind> {
        match self.kind {
            NoteKind::Sustain { sustain, .. } => Some(sustain),
            _ => None,
        }
    }

    pub fn part(&self) -> Option<SustainPart> {
        match self.kind {
            NoteKind::Sustain { part, .. } => Some(part),
            _ => None,
        }
    }

    /// Head-level notes are the ones a selection carries: single notes and
    /// sustain begins. Intermediate and end segments are derived from them.
    pub fn is_head(&self) -> bool {
        !matches!(
            self.part(),
            Some(SustainPart::Intermediate) | Some(SustainPart::End)
        )
    }

    /// Latest time covered by this note (the end for sustains).
    pub fn end_time(&self) -> Time {
        self.span().map_or(self.time, |span| span.end)
    }
}
