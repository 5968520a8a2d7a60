//! Cell barcode handling

use rustc_hash::FxHashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::io::get_reader;

/// Ordered set of unique cell barcodes.
///
/// The order read from the barcode file is the column order of every output.
#[derive(Debug, Clone, Default)]
pub struct BarcodeSet {
    ordered_barcodes: Arc<Vec<String>>,
    barcode_to_id: Arc<FxHashMap<String, u32>>,
}

impl BarcodeSet {
    /// Read one barcode per line; `.gz` files are decompressed on the fly.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(get_reader(path)?)
    }

    fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut barcodes = Vec::with_capacity(1024);
        for line in reader.lines() {
            let line = line?;
            let barcode = line.trim_end_matches(['\r', '\n']);
            if !barcode.is_empty() {
                barcodes.push(barcode.to_string());
            }
        }
        Ok(Self::from_vec(barcodes))
    }

    /// Construct a set from an explicit list, keeping the first occurrence of duplicates.
    pub fn from_vec(barcodes: Vec<String>) -> Self {
        let mut ordered = Vec::with_capacity(barcodes.len());
        let mut index = FxHashMap::with_capacity_and_hasher(barcodes.len(), Default::default());
        for barcode in barcodes {
            if index.contains_key(&barcode) {
                continue;
            }
            index.insert(barcode.clone(), ordered.len() as u32);
            ordered.push(barcode);
        }

        ordered.shrink_to_fit();
        BarcodeSet {
            ordered_barcodes: Arc::new(ordered),
            barcode_to_id: Arc::new(index),
        }
    }

    /// Column index of a barcode, if present.
    #[inline]
    pub fn id_of(&self, barcode: &str) -> Option<u32> {
        self.barcode_to_id.get(barcode).copied()
    }

    pub fn len(&self) -> usize {
        self.ordered_barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_barcodes.is_empty()
    }

    /// Borrow the barcodes in column order.
    pub fn ordered_barcodes(&self) -> &[String] {
        self.ordered_barcodes.as_ref()
    }
}
