//! Variant Call Matrix processor.

use crate::core::error::Result;
use crate::engine::par_variants::{Variant, VariantProcessor};
use crate::engine::pileup::AlignedRead;
use crate::pipeline::barcode::BarcodeSet;
use crate::pipeline::consensus::call_cells;
use crate::pipeline::tables::{vcm_header, vcm_line};

/// Emits one VCM row per variant with a consensus call for every barcode.
#[derive(Debug, Clone)]
pub struct VcmProcessor {
    barcodes: BarcodeSet,
    min_coverage: usize,
}

impl VcmProcessor {
    pub fn new(barcodes: BarcodeSet, min_coverage: usize) -> Self {
        Self {
            barcodes,
            min_coverage,
        }
    }

    pub fn header(&self) -> String {
        vcm_header(self.barcodes.ordered_barcodes())
    }
}

impl VariantProcessor for VcmProcessor {
    fn process_variant(&self, variant: &Variant, reads: &[AlignedRead]) -> Result<String> {
        let calls = call_cells(reads, variant.start, &self.barcodes, self.min_coverage)?;
        Ok(vcm_line(variant, &calls))
    }
}
