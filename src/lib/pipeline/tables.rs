//! Line formats of the persisted tables.
//!
//! All tables are tab separated with a trailing newline; fields are written as
//! is, without quoting.

use crate::engine::par_variants::Variant;
use crate::pipeline::consensus::ConsensusCall;
use crate::pipeline::frequency::FrequencyVector;

/// Base columns of a VFF file, in order.
pub const VFF_BASES: [char; 4] = ['A', 'C', 'T', 'G'];

/// Number of fields in a VFF row.
pub const VFF_FIELDS: usize = 8;

/// `Contig\tPosition\tReference\t<barcode_1>...\n`
pub fn vcm_header<S: AsRef<str>>(barcodes: &[S]) -> String {
    let mut header = String::from("Contig\tPosition\tReference");
    for barcode in barcodes {
        header.push('\t');
        header.push_str(barcode.as_ref());
    }
    header.push('\n');
    header
}

pub fn vcm_line(variant: &Variant, calls: &[ConsensusCall]) -> String {
    let mut line = variant_prefix(variant, calls.len() * 2);
    for call in calls {
        line.push('\t');
        line.push(call.as_char());
    }
    line.push('\n');
    line
}

pub fn vff_header() -> String {
    let mut header = String::from("Contig\tPosition\tReference");
    for base in VFF_BASES {
        header.push('\t');
        header.push(base);
    }
    header.push_str("\tTotal\n");
    header
}

pub fn vff_line(variant: &Variant, frequencies: &FrequencyVector) -> String {
    let mut line = variant_prefix(variant, 32);
    for count in [
        frequencies.a,
        frequencies.c,
        frequencies.t,
        frequencies.g,
        frequencies.total(),
    ] {
        line.push('\t');
        line.push_str(&count.to_string());
    }
    line.push('\n');
    line
}

/// `Contig\tPosition\t<cell_1>...\n`
pub fn merged_header<S: AsRef<str>>(cells: &[S]) -> String {
    let mut header = String::from("Contig\tPosition");
    for cell in cells {
        header.push('\t');
        header.push_str(cell.as_ref());
    }
    header.push('\n');
    header
}

pub fn merged_line(contig: &str, position: &str, symbols: &[char]) -> String {
    let mut line = String::with_capacity(contig.len() + position.len() + symbols.len() * 2 + 2);
    line.push_str(contig);
    line.push('\t');
    line.push_str(position);
    for symbol in symbols {
        line.push('\t');
        line.push(*symbol);
    }
    line.push('\n');
    line
}

fn variant_prefix(variant: &Variant, extra: usize) -> String {
    let mut line = String::with_capacity(variant.contig.len() + variant.reference.len() + 16 + extra);
    line.push_str(&variant.contig);
    line.push('\t');
    line.push_str(&variant.pos.to_string());
    line.push('\t');
    line.push_str(&variant.reference);
    line
}
