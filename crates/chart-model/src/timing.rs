// Tempo, stop and scroll velocity entities.

use serde::{Deserialize, Serialize};

use crate::Time;
use crate::bucket::Bucket;
use crate::handle::EntityId;

const MS_PER_MINUTE: f64 = 60000.0;

/// Tempo declaration governing all time until the next tempo point.
///
/// `beat_length` is always `60000 / bpm`; whichever of the two was written
/// last wins and the other is recomputed. Deserialized points take their
/// beat length from `bpm`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredTempoPoint")]
pub struct TempoPoint {
    pub(crate) id: EntityId,
    /// Time in milliseconds
    pub time: Time,
    bpm: f64,
    beat_length: f64,
}

impl TempoPoint {
    pub fn new(time: Time, bpm: f64) -> Self {
        Self {
            id: EntityId::NONE,
            time,
            bpm,
            beat_length: MS_PER_MINUTE / bpm,
        }
    }

    pub fn from_beat_length(time: Time, beat_length: f64) -> Self {
        Self {
            id: EntityId::NONE,
            time,
            bpm: MS_PER_MINUTE / beat_length,
            beat_length,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Length of one beat in milliseconds
    pub fn beat_length(&self) -> f64 {
        self.beat_length
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm;
        self.beat_length = MS_PER_MINUTE / bpm;
    }

    pub fn set_beat_length(&mut self, beat_length: f64) {
        self.beat_length = beat_length;
        self.bpm = MS_PER_MINUTE / beat_length;
    }

    pub fn with_time(mut self, time: Time) -> Self {
        self.time = time;
        self
    }

    /// Finite positive bpm with a beat length that matches it.
    pub fn is_valid(&self) -> bool {
        self.bpm.is_finite()
            && self.bpm > 0.0
            && self.beat_length.is_finite()
            && (self.beat_length - MS_PER_MINUTE / self.bpm).abs() <= 1e-9 * self.beat_length.max(1.0)
    }
}

#[derive(Deserialize)]
struct StoredTempoPoint {
    #[serde(default)]
    id: EntityId,
    time: Time,
    bpm: f64,
}

impl From<StoredTempoPoint> for TempoPoint {
    fn from(stored: StoredTempoPoint) -> Self {
        let mut point = TempoPoint::new(stored.time, stored.bpm);
        point.id = stored.id;
        point
    }
}

/// Pause in playback without advancing the musical beat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopPoint {
    pub(crate) id: EntityId,
    /// Time in milliseconds
    pub time: Time,
    /// Pause length in seconds
    pub length: f64,
}

impl StopPoint {
    pub fn new(time: Time, length: f64) -> Self {
        Self {
            id: EntityId::NONE,
            time,
            length,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn with_time(mut self, time: Time) -> Self {
        self.time = time;
        self
    }
}

/// Scroll velocity multiplier. Affects rendering speed only, not timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollVelocity {
    pub(crate) id: EntityId,
    /// Time in milliseconds
    pub time: Time,
    pub multiplier: f64,
}

impl ScrollVelocity {
    pub fn new(time: Time, multiplier: f64) -> Self {
        Self {
            id: EntityId::NONE,
            time,
            multiplier,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn with_time(mut self, time: Time) -> Self {
        self.time = time;
        self
    }
}

/// Common access to the three timing lists of a bucket.
pub(crate) trait TimedEntity: Copy + PartialEq {
    const LABEL: &'static str;

    fn time(&self) -> Time;
    fn set_time(&mut self, time: Time);
    fn id(&self) -> EntityId;
    fn set_id(&mut self, id: EntityId);
    fn list(bucket: &Bucket) -> &Vec<Self>;
    fn list_mut(bucket: &mut Bucket) -> &mut Vec<Self>;

    /// Same entity: by id when both sides carry one, by value otherwise.
    fn same_entity(&self, other: &Self) -> bool {
        if self.id().is_assigned() && other.id().is_assigned() {
            return self.id() == other.id();
        }
        let mut lhs = *self;
        let mut rhs = *other;
        lhs.set_id(EntityId::NONE);
        rhs.set_id(EntityId::NONE);
        lhs == rhs
    }
}

macro_rules! impl_timed_entity {
    ($ty:ty, $label:literal, $field:ident) => {
        impl TimedEntity for $ty {
            const LABEL: &'static str = $label;

            fn time(&self) -> Time {
                self.time
            }

            fn set_time(&mut self, time: Time) {
                self.time = time;
            }

            fn id(&self) -> EntityId {
                self.id
            }

            fn set_id(&mut self, id: EntityId) {
                self.id = id;
            }

            fn list(bucket: &Bucket) -> &Vec<Self> {
                &bucket.$field
            }

            fn list_mut(bucket: &mut Bucket) -> &mut Vec<Self> {
                &mut bucket.$field
            }
        }
    };
}

impl_timed_entity!(TempoPoint, "tempo point", tempo_points);
impl_timed_entity!(StopPoint, "stop", stops);
impl_timed_entity!(ScrollVelocity, "scroll velocity", svs);

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_tempo_invariant(point: &TempoPoint) {
        assert!((point.beat_length() - 60000.0 / point.bpm()).abs() < 1e-9);
    }

    #[test]
    fn test_tempo_from_bpm() {
        let point = TempoPoint::new(0, 120.0);
        assert_eq!(point.beat_length(), 500.0);
        assert_tempo_invariant(&point);
    }

    #[test]
    fn test_tempo_from_beat_length() {
        let point = TempoPoint::from_beat_length(0, 250.0);
        assert_eq!(point.bpm(), 240.0);
        assert_tempo_invariant(&point);
    }

    #[test]
    fn test_last_write_wins() {
        let mut point = TempoPoint::new(0, 120.0);
        point.set_beat_length(400.0);
        assert_eq!(point.bpm(), 150.0);
        assert_tempo_invariant(&point);
        point.set_bpm(180.0);
        assert_tempo_invariant(&point);
    }

    #[test]
    fn test_deserialized_tempo_derives_beat_length() {
        let point: TempoPoint =
            serde_json::from_str(r#"{"id":0,"time":0,"bpm":120.0,"beat_length":100.0}"#).unwrap();
        assert_eq!(point.beat_length(), 500.0);
        assert_tempo_invariant(&point);
        assert!(point.is_valid());

        let point: TempoPoint = serde_json::from_str(r#"{"time":250,"bpm":150.0}"#).unwrap();
        assert_eq!(point.time, 250);
        assert_eq!(point.beat_length(), 400.0);
    }

    #[test]
    fn test_tempo_validity() {
        assert!(TempoPoint::new(0, 60.0).is_valid());
        assert!(!TempoPoint::new(0, 0.0).is_valid());
        assert!(!TempoPoint::new(0, -10.0).is_valid());
        assert!(!TempoPoint::new(0, f64::NAN).is_valid());
    }

    #[test]
    fn test_same_entity_by_value_without_ids() {
        let a = StopPoint::new(100, 1.5);
        assert!(a.same_entity(&StopPoint::new(100, 1.5)));
        assert!(!a.same_entity(&StopPoint::new(100, 2.0)));

        let mut stored = a;
        stored.set_id(EntityId::from_raw(7));
        assert!(stored.same_entity(&a));

        let mut other = a;
        other.set_id(EntityId::from_raw(8));
        assert!(!stored.same_entity(&other));
    }
}
