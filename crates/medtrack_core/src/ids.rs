//! crates/medtrack_core/src/ids.rs
//!
//! Derives the numeric platform notification id for one slot of a
//! medication's schedule. The id must come out the same on every reschedule so
//! that cancel and snooze find the entry they are after.

use std::str::FromStr;

use crate::domain::NotificationId;

/// Slots per medication the hashed scheme has room for.
pub const MAX_HASHED_SLOTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("notification id for '{medication_id}' slot {slot_index} does not fit the platform id type")]
    OutOfRange {
        medication_id: String,
        slot_index: usize,
    },
    #[error("slot {0} exceeds the 100 slots the hashed id scheme supports")]
    SlotOutOfRange(usize),
    #[error("unknown notification id scheme '{0}' (expected 'legacy' or 'hashed')")]
    UnknownScheme(String),
}

/// How medication ids map onto notification ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdScheme {
    /// Last four digits of the medication id followed by the slot index.
    /// Matches notifications already pending on devices, but two medications
    /// sharing their last four digits collide.
    #[default]
    Legacy,
    /// FNV-1a of the whole medication id, leaving two decimal places for the slot.
    Hashed,
}

impl IdScheme {
    pub fn derive(&self, medication_id: &str, slot_index: usize) -> Result<NotificationId, IdError> {
        match self {
            Self::Legacy => derive_id(medication_id, slot_index),
            Self::Hashed => derive_hashed_id(medication_id, slot_index),
        }
    }
}

impl FromStr for IdScheme {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "hashed" => Ok(Self::Hashed),
            other => Err(IdError::UnknownScheme(other.to_string())),
        }
    }
}

/// Strips every non-digit from `medication_id`, keeps the last four digits and
/// appends the decimal slot index. An id without digits yields the bare slot.
pub fn derive_id(medication_id: &str, slot_index: usize) -> Result<NotificationId, IdError> {
    let digits: String = medication_id.chars().filter(char::is_ascii_digit).collect();
    let tail = &digits[digits.len().saturating_sub(4)..];

    format!("{tail}{slot_index}")
        .parse::<i32>()
        .map(NotificationId)
        .map_err(|_| IdError::OutOfRange {
            medication_id: medication_id.to_string(),
            slot_index,
        })
}

pub fn derive_hashed_id(medication_id: &str, slot_index: usize) -> Result<NotificationId, IdError> {
    if slot_index >= MAX_HASHED_SLOTS {
        return Err(IdError::SlotOutOfRange(slot_index));
    }
    // 24 bits * 100 + 99 stays below i32::MAX.
    let bucket = (fnv1a(medication_id.as_bytes()) & 0x00FF_FFFF) as i32;
    Ok(NotificationId(bucket * MAX_HASHED_SLOTS as i32 + slot_index as i32))
}

fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn legacy_ids_for_known_medication() {
        assert_eq!(derive_id("med-1234", 0), Ok(NotificationId(12340)));
        assert_eq!(derive_id("med-1234", 2), Ok(NotificationId(12342)));
    }

    #[test]
    fn legacy_keeps_only_last_four_digits() {
        assert_eq!(derive_id("a9b8c7d6e5", 1), Ok(NotificationId(87651)));
        assert_eq!(derive_id("x42", 3), Ok(NotificationId(423)));
    }

    #[test]
    fn legacy_leading_zeros_collapse() {
        assert_eq!(derive_id("med-0012", 0), Ok(NotificationId(120)));
    }

    #[test]
    fn legacy_without_digits_is_the_slot() {
        assert_eq!(derive_id("aspirin", 0), Ok(NotificationId(0)));
        assert_eq!(derive_id("aspirin", 7), Ok(NotificationId(7)));
    }

    #[test]
    fn legacy_overflow_is_an_error() {
        assert!(matches!(
            derive_id("med-9999", 9_999_999),
            Err(IdError::OutOfRange { slot_index: 9_999_999, .. })
        ));
    }

    #[test]
    fn distinct_slots_never_collide() {
        for medication_id in ["med-1234", "0000", "no-digits", "7", "abc-0090"] {
            for scheme in [IdScheme::Legacy, IdScheme::Hashed] {
                let ids: HashSet<_> = (0..MAX_HASHED_SLOTS)
                    .map(|slot| scheme.derive(medication_id, slot).unwrap())
                    .collect();
                assert_eq!(ids.len(), MAX_HASHED_SLOTS, "{scheme:?} collided for {medication_id}");
            }
        }
    }

    #[test]
    fn hashed_separates_medications_sharing_digits() {
        assert_eq!(derive_id("alpha-1234", 0), derive_id("beta-1234", 0));
        assert_ne!(
            derive_hashed_id("alpha-1234", 0).unwrap(),
            derive_hashed_id("beta-1234", 0).unwrap()
        );
    }

    #[test]
    fn hashed_is_stable_and_positive() {
        let first = derive_hashed_id("med-1234", 5).unwrap();
        assert_eq!(first, derive_hashed_id("med-1234", 5).unwrap());
        assert!(first.0 >= 0);
        assert_eq!(first.0 % 100, 5);
        assert_eq!(derive_hashed_id("med-1234", 100), Err(IdError::SlotOutOfRange(100)));
    }

    #[test]
    fn scheme_from_str() {
        assert_eq!("Hashed".parse::<IdScheme>(), Ok(IdScheme::Hashed));
        assert_eq!(" legacy ".parse::<IdScheme>(), Ok(IdScheme::Legacy));
        assert!(matches!("sha".parse::<IdScheme>(), Err(IdError::UnknownScheme(_))));
    }
}
