//! Storage for quantized samples.
//!
//! Samples are kept in the unsigned integer type selected by the resolution,
//! so a table of 8 bit samples really occupies one byte per sample. Reading
//! always widens to u64.

use super::error::{GenError, Result};
use super::resolution::StorageType;

use num::{NumCast, ToPrimitive};
use serde::Serialize;

/// Container for the different storage types.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SampleData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

impl SampleData {
    /// Create an empty container for the given storage type.
    pub fn with_capacity(storage: StorageType, capacity: usize) -> SampleData {
        match storage {
            StorageType::U8 => SampleData::U8(Vec::with_capacity(capacity)),
            StorageType::U16 => SampleData::U16(Vec::with_capacity(capacity)),
            StorageType::U32 => SampleData::U32(Vec::with_capacity(capacity)),
            StorageType::U64 => SampleData::U64(Vec::with_capacity(capacity)),
        }
    }

    /// Get the number of samples in the container.
    pub fn len(&self) -> usize {
        match self {
            SampleData::U8(v) => v.len(),
            SampleData::U16(v) => v.len(),
            SampleData::U32(v) => v.len(),
            SampleData::U64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            SampleData::U8(_) => StorageType::U8,
            SampleData::U16(_) => StorageType::U16,
            SampleData::U32(_) => StorageType::U32,
            SampleData::U64(_) => StorageType::U64,
        }
    }

    /// Append a sample, narrowing it to the storage type.
    pub fn push(&mut self, value: u64) -> Result<()> {
        match self {
            SampleData::U8(v) => push_narrowed(v, value, StorageType::U8),
            SampleData::U16(v) => push_narrowed(v, value, StorageType::U16),
            SampleData::U32(v) => push_narrowed(v, value, StorageType::U32),
            SampleData::U64(v) => push_narrowed(v, value, StorageType::U64),
        }
    }

    /// Return the sample at the given index, widened to u64.
    pub fn get(&self, index: usize) -> Option<u64> {
        match self {
            SampleData::U8(v) => widened(v, index),
            SampleData::U16(v) => widened(v, index),
            SampleData::U32(v) => widened(v, index),
            SampleData::U64(v) => widened(v, index),
        }
    }
}

fn push_narrowed<T: NumCast>(data: &mut Vec<T>, value: u64, storage: StorageType) -> Result<()> {
    match <T as NumCast>::from(value) {
        Some(sample) => {
            data.push(sample);
            Ok(())
        }
        None => Err(GenError::SampleOverflow { value, storage: storage.c_type() }),
    }
}

fn widened<T: ToPrimitive>(data: &[T], index: usize) -> Option<u64> {
    data.get(index).and_then(|s| s.to_u64())
}

/// An ordered sequence of quantized samples.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleTable {
    data: SampleData,
}

impl SampleTable {
    /// Create an empty table with room for the given number of samples.
    ///
    /// ```
    /// use wavegen::{SampleTable, StorageType};
    ///
    /// let mut table = SampleTable::new(StorageType::U16, 2);
    /// table.push(0).unwrap();
    /// table.push(4095).unwrap();
    /// assert_eq!(table.to_vec(), vec![0, 4095]);
    /// assert_eq!(table.range(), Some((0, 4095)));
    /// ```
    pub fn new(storage: StorageType, capacity: usize) -> SampleTable {
        SampleTable{data: SampleData::with_capacity(storage, capacity)}
    }

    pub fn push(&mut self, value: u64) -> Result<()> {
        self.data.push(value)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u64> {
        self.data.get(index)
    }

    pub fn data(&self) -> &SampleData {
        &self.data
    }

    pub fn storage_type(&self) -> StorageType {
        self.data.storage_type()
    }

    /// Iterate over all samples in index order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len()).filter_map(move |i| self.data.get(i))
    }

    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }

    /// Smallest and largest sample, None for an empty table.
    pub fn range(&self) -> Option<(u64, u64)> {
        let mut iter = self.iter();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), s| (min.min(s), max.max(s))))
    }

    /// Memory used by the samples in their storage type.
    pub fn num_bytes(&self) -> usize {
        self.len() * self.storage_type().bytes()
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn samples_are_stored_in_selected_type() {
    let mut table = SampleTable::new(StorageType::U8, 3);
    table.push(0).unwrap();
    table.push(128).unwrap();
    table.push(255).unwrap();
    assert_eq!(*table.data(), SampleData::U8(vec![0, 128, 255]));
    assert_eq!(table.num_bytes(), 3);

    let mut table = SampleTable::new(StorageType::U64, 1);
    table.push(u64::MAX).unwrap();
    assert_eq!(table.get(0), Some(u64::MAX));
    assert_eq!(table.num_bytes(), 8);
}

#[test]
fn narrowing_overflow_is_an_error() {
    let mut table = SampleTable::new(StorageType::U16, 1);
    match table.push(65536) {
        Err(GenError::SampleOverflow { value, storage }) => {
            assert_eq!(value, 65536);
            assert_eq!(storage, "uint16_t");
        }
        other => panic!("Expected SampleOverflow, got {:?}", other),
    }
    assert!(table.is_empty());
}

#[test]
fn range_of_empty_table_is_none() {
    let table = SampleTable::new(StorageType::U32, 0);
    assert_eq!(table.range(), None);
    assert_eq!(table.get(0), None);
}

#[test]
fn table_serializes_as_plain_array() {
    let mut table = SampleTable::new(StorageType::U16, 2);
    table.push(1).unwrap();
    table.push(2).unwrap();
    assert_eq!(serde_json::to_string(&table).unwrap(), "[1,2]");
}
