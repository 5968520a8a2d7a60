//! Stage logic for the `vcm`, `vff` and `merge` commands.

pub mod barcode;
pub mod consensus;
pub mod frequency;
pub mod merge;
pub mod sources;
pub mod tables;
#[cfg(test)]
mod test_files;
pub mod vcm;
pub mod vff;

pub mod prelude {
    pub use super::barcode::BarcodeSet;
    pub use super::consensus::{call_cells, most_common_base, ConsensusCall};
    pub use super::frequency::{base_frequencies, FrequencyVector};
    pub use super::merge::{merge_folder, EncodedSequence, MergeConfig, Symbol};
    pub use super::sources::{
        ensure_bam_index, AlignmentOptions, HtsAlignmentSource, HtsVariantSource,
        CELL_BARCODE_TAG,
    };
    pub use super::vcm::VcmProcessor;
    pub use super::vff::{make_vff, vff_path, VffInputs, VffProcessor};
}
