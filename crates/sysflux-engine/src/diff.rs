use std::collections::HashMap;
use std::sync::Mutex;
use sysflux_common::types::{FieldValue, Sample};

/// Last-observed raw field values, keyed by series key then field name.
type LastSeen = HashMap<String, HashMap<String, FieldValue>>;

/// Converts cumulative counter samples into per-interval deltas.
///
/// The engine keeps one last-seen value per (series key, field) pair for
/// the lifetime of the process. Entries are never evicted: a network
/// interface that disappears leaves its last reading behind. All metric
/// source tasks in a collection round share one engine; the state table
/// is guarded by a mutex so they can diff concurrently.
pub struct DiffEngine {
    consistency_factor: f64,
    last_seen: Mutex<LastSeen>,
}

impl DiffEngine {
    /// Create an engine with the given consistency factor.
    ///
    /// The factor rescales every delta to normalize for drift between
    /// the configured consistency window and the collection interval;
    /// `1.0` leaves deltas untouched.
    pub fn new(consistency_factor: f64) -> Self {
        Self {
            consistency_factor,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the sample's counter fields with deltas against the last
    /// observation of the same series.
    ///
    /// Returns `None` when any field of the sample is being observed for
    /// the first time: a delta needs two readings, so the whole sample is
    /// withheld rather than emitting a half-diffed one. The new raw
    /// values are recorded either way, seeding the next round.
    ///
    /// Non-integer fields ([`FieldValue::F64`]) participate in the
    /// first-observation bookkeeping but pass through with their raw
    /// value on every later round.
    pub fn diff(&self, mut sample: Sample) -> Option<Sample> {
        let key = sample.series_key();
        let mut incomplete = false;

        let mut last_seen = self.last_seen.lock().unwrap();
        let series = last_seen.entry(key).or_default();

        for (field, value) in sample.fields.iter_mut() {
            match series.insert(field.clone(), *value) {
                None => incomplete = true,
                Some(last) => {
                    if let Some(delta) = subtract_and_scale(*value, last, self.consistency_factor)
                    {
                        *value = delta;
                    }
                }
            }
        }

        if incomplete {
            None
        } else {
            Some(sample)
        }
    }

    /// Number of distinct series observed so far.
    pub fn series_count(&self) -> usize {
        self.last_seen.lock().unwrap().len()
    }
}

/// Kind-preserving delta: subtraction runs in the field's own integer
/// domain (wrapping, so a wrapped counter yields the modular difference),
/// the consistency scaling runs in `f64`, and the result is cast back to
/// the original kind truncating toward zero.
///
/// Returns `None` for non-integer kinds and for kind mismatches between
/// the two observations; the caller passes the raw value through.
fn subtract_and_scale(new: FieldValue, last: FieldValue, factor: f64) -> Option<FieldValue> {
    use FieldValue::*;

    macro_rules! delta {
        ($kind:ident, $new:expr, $last:expr) => {
            $kind(($new.wrapping_sub($last) as f64 * factor) as _)
        };
    }

    match (new, last) {
        (I8(n), I8(l)) => Some(delta!(I8, n, l)),
        (I16(n), I16(l)) => Some(delta!(I16, n, l)),
        (I32(n), I32(l)) => Some(delta!(I32, n, l)),
        (I64(n), I64(l)) => Some(delta!(I64, n, l)),
        (U8(n), U8(l)) => Some(delta!(U8, n, l)),
        (U16(n), U16(l)) => Some(delta!(U16, n, l)),
        (U32(n), U32(l)) => Some(delta!(U32, n, l)),
        (U64(n), U64(l)) => Some(delta!(U64, n, l)),
        _ => None,
    }
}
