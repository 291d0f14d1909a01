//! Size unit conversion for prepaid package balances.

use std::str::FromStr;
use strum::EnumString;

/// Size units reported by the billing API, binary multiples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum SizeUnit {
    Byte,
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    pub fn multiplier(self) -> f64 {
        match self {
            SizeUnit::Byte => 1.0,
            SizeUnit::KB => 1024.0,
            SizeUnit::MB => 1024.0 * 1024.0,
            SizeUnit::GB => 1024.0 * 1024.0 * 1024.0,
            SizeUnit::TB => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        }
    }
}

/// Multiplier converting a quantity in `unit` to bytes.
///
/// Unrecognised labels map to 1: the quantity is taken as already in bytes.
pub fn unit_multiplier(unit: &str) -> f64 {
    SizeUnit::from_str(unit.trim())
        .map(SizeUnit::multiplier)
        .unwrap_or(1.0)
}

/// Convert `amount` expressed in `unit` to bytes.
pub fn to_bytes(amount: f64, unit: &str) -> f64 {
    amount * unit_multiplier(unit)
}
