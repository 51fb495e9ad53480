//! Mora sequence → diphone keys.
//!
//! A key names the transition into a mora: the tail of the previous sound
//! followed by the current mora label (`_ka`, `an`, `oqq`, …).  `_` stands
//! for silence, so every reading unit starts with `_x` and closes with `x_`.

use crate::{
    mora::{self, Mora},
    yomi::Reading,
};

/// Silence marker used at unit boundaries and around pauses.
pub const SILENCE: &str = "_";

/// Length class of a pause key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pause {
    Short,
    Long,
}

/// Pause length named by `key`, if it is a pause key.
pub fn pause_of(key: &str) -> Option<Pause> {
    match key {
        Mora::PERIOD => Some(Pause::Long),
        Mora::COMMA => Some(Pause::Short),
        _ => None,
    }
}

/// Append the keys for one reading unit's morae to `out`.
pub fn unit_keys(morae: &[Mora], out: &mut Vec<String>) {
    let mut tail = SILENCE;
    for m in morae {
        let name = m.name();
        match name {
            Mora::PERIOD | Mora::COMMA => {
                out.push(format!("{tail}{SILENCE}"));
                out.push(name.to_string());
                tail = SILENCE;
            }
            Mora::LONG => out.push(tail.to_string()),
            Mora::GEMINATE => {
                out.push(format!("{tail}{name}"));
                tail = SILENCE;
            }
            _ => {
                out.push(format!("{tail}{name}"));
                // labels are ASCII
                tail = if m.is_long_vowel() { &name[..1] } else { &name[name.len() - 1..] };
            }
        }
    }
    out.push(format!("{tail}{SILENCE}"));
}

/// Keys for a sequence of reading units, in order.
pub fn keys_for(readings: &[Reading]) -> Vec<String> {
    let mut keys = Vec::new();
    for r in readings {
        let source = if r.reading.is_empty() { &r.surface } else { &r.reading };
        unit_keys(&mora::parse(source), &mut keys);
    }
    keys
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
