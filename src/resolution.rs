//! Output resolution of a generated table.
//!
//! A resolution is defined by the number of bits per sample. From that the
//! largest sample value, the center value (zero amplitude) and the unsigned
//! integer type used to store the samples are derived.
//!
//! The storage type is the smallest of u8, u16, u32 and u64 holding the
//! requested number of bits. The value range is always derived from the
//! requested width, so a 12 bit table stores values up to 4095 in a u16.

use super::error::{GenError, Result};

use log::debug;
use serde::{Serialize, Deserialize};

/// Bit-widths accepted for generation runs.
pub const SUPPORTED_BIT_WIDTHS: [u32; 8] = [8, 10, 12, 14, 16, 24, 32, 64];

/// Unsigned integer type holding the samples of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    U8,
    U16,
    U32,
    U64,
}

impl StorageType {
    /// Select the smallest storage type for the given number of bits.
    ///
    /// Widths between the ladder entries round up to the next larger type.
    /// Returns None for 0 or more than 64 bits.
    ///
    /// ```
    /// use wavegen::StorageType;
    ///
    /// assert_eq!(StorageType::for_bits(8), Some(StorageType::U8));
    /// assert_eq!(StorageType::for_bits(12), Some(StorageType::U16));
    /// assert_eq!(StorageType::for_bits(65), None);
    /// ```
    pub fn for_bits(bits: u32) -> Option<StorageType> {
        match bits {
            1..=8 => Some(StorageType::U8),
            9..=16 => Some(StorageType::U16),
            17..=32 => Some(StorageType::U32),
            33..=64 => Some(StorageType::U64),
            _ => None,
        }
    }

    /// Size of one sample in bytes.
    pub fn bytes(&self) -> usize {
        match self {
            StorageType::U8 => 1,
            StorageType::U16 => 2,
            StorageType::U32 => 4,
            StorageType::U64 => 8,
        }
    }

    /// Width of the storage type in bits.
    pub fn bits(&self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// Name of the matching fixed width type in <stdint.h>.
    pub fn c_type(&self) -> &'static str {
        match self {
            StorageType::U8 => "uint8_t",
            StorageType::U16 => "uint16_t",
            StorageType::U32 => "uint32_t",
            StorageType::U64 => "uint64_t",
        }
    }

    /// Suffix needed for integer literals of this type in C.
    ///
    /// Unsuffixed decimal literals are signed in C, which cannot represent
    /// the upper half of the 64 bit range.
    pub fn c_literal_suffix(&self) -> &'static str {
        match self {
            StorageType::U8 | StorageType::U16 => "",
            StorageType::U32 => "UL",
            StorageType::U64 => "ULL",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    bits: u32,
    max_value: u64,
    center: u64,
    storage: StorageType,
}

impl Resolution {
    /// Create a resolution for one of the supported bit-widths.
    ///
    /// ```
    /// use wavegen::{Resolution, StorageType};
    ///
    /// let res = Resolution::new(12).unwrap();
    /// assert_eq!(res.max_value(), 4095);
    /// assert_eq!(res.center(), 2048);
    /// assert_eq!(res.storage(), StorageType::U16);
    ///
    /// assert!(Resolution::new(11).is_err());
    /// ```
    pub fn new(bits: u32) -> Result<Resolution> {
        if !SUPPORTED_BIT_WIDTHS.contains(&bits) {
            return Err(GenError::UnsupportedBitWidth { bits, supported: SUPPORTED_BIT_WIDTHS.to_vec() });
        }
        // Every supported width is on the ladder
        let storage = match StorageType::for_bits(bits) {
            Some(s) => s,
            None => return Err(GenError::UnsupportedBitWidth { bits, supported: SUPPORTED_BIT_WIDTHS.to_vec() }),
        };
        let max_value = if bits == 64 { u64::MAX } else { (1_u64 << bits) - 1 };
        // round(max_value / 2.0), half away from zero
        let center = 1_u64 << (bits - 1);
        debug!("Resolution {} bits: max {}, center {}, stored as {}",
            bits, max_value, center, storage.c_type());
        Ok(Resolution{bits, max_value, center, storage})
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Largest representable sample, 2^bits - 1.
    pub fn max_value(&self) -> u64 {
        self.max_value
    }

    /// Sample value representing zero amplitude.
    pub fn center(&self) -> u64 {
        self.center
    }

    pub fn storage(&self) -> StorageType {
        self.storage
    }

    /// Number of decimal digits of the largest sample value.
    pub fn max_digits(&self) -> usize {
        self.max_value.to_string().len()
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn max_value_matches_bit_width() {
    for bits in SUPPORTED_BIT_WIDTHS.iter() {
        let res = Resolution::new(*bits).unwrap();
        let expected = (2_u128.pow(*bits) - 1) as u64;
        assert_eq!(res.max_value(), expected);
        assert!(res.storage().bits() >= *bits);
    }
}

#[test]
fn storage_ladder_has_no_gaps() {
    for bits in 1..=8 {
        assert_eq!(StorageType::for_bits(bits).unwrap().bytes(), 1);
    }
    for bits in 9..=16 {
        assert_eq!(StorageType::for_bits(bits).unwrap().bytes(), 2);
    }
    for bits in 17..=32 {
        assert_eq!(StorageType::for_bits(bits).unwrap().bytes(), 4);
    }
    for bits in 33..=64 {
        assert_eq!(StorageType::for_bits(bits).unwrap().bytes(), 8);
    }
    assert_eq!(StorageType::for_bits(0), None);
    assert_eq!(StorageType::for_bits(65), None);
}

#[test]
fn center_is_half_of_range_rounded_up() {
    assert_eq!(Resolution::new(8).unwrap().center(), 128);
    assert_eq!(Resolution::new(16).unwrap().center(), 32768);
    assert_eq!(Resolution::new(64).unwrap().center(), 1_u64 << 63);
}

#[test]
fn unsupported_width_is_rejected() {
    for bits in [0, 7, 9, 33, 65].iter() {
        match Resolution::new(*bits) {
            Err(GenError::UnsupportedBitWidth { bits: b, supported }) => {
                assert_eq!(b, *bits);
                assert_eq!(supported, SUPPORTED_BIT_WIDTHS.to_vec());
            }
            other => panic!("Expected UnsupportedBitWidth, got {:?}", other),
        }
    }
}
