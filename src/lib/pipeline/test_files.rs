//! Small indexed BAM and VCF files written into a scratch directory.
//!
//! Reads on `chr1` (0-based positions):
//!
//! | name | start | cigar    | CB | mapq | base at 99 / 299 |
//! |------|-------|----------|----|------|------------------|
//! | r1   | 95    | 10M      | C1 | 60   | A                |
//! | r2   | 95    | 10M      | C1 | 60   | A                |
//! | r3   | 95    | 10M      | C2 | 60   | C                |
//! | r4   | 96    | 10M      | -  | 60   | G                |
//! | r5   | 96    | 10M      | C1 | 5    | T                |
//! | r6   | 97    | 2M1D3M   | C2 | 60   | deletion         |
//! | r7   | 295   | 10M      | C1 | 60   | T (at 299)       |
//!
//! Variants: `chr1:100 A>G PASS`, `chr1:200 C>T q10`, `chr1:300 G>A .`.

use rust_htslib::bam::{
    self,
    record::{Aux, Cigar, CigarString},
};
use rust_htslib::bcf;
use std::path::{Path, PathBuf};

use crate::pipeline::sources::ensure_bam_index;

pub(crate) const CONTIG: &str = "chr1";
pub(crate) const MIN_MAPQ: u8 = 10;

struct Read {
    name: &'static str,
    start: i64,
    cigar: Vec<Cigar>,
    barcode: Option<&'static str>,
    mapq: u8,
    seq: &'static [u8],
}

fn reads() -> Vec<Read> {
    let read = |name, start, barcode, mapq, seq| Read {
        name,
        start,
        cigar: vec![Cigar::Match(10)],
        barcode,
        mapq,
        seq,
    };
    vec![
        read("r1", 95, Some("C1"), 60, b"GGGGAGGGGG"),
        read("r2", 95, Some("C1"), 60, b"TTTTATTTTT"),
        read("r3", 95, Some("C2"), 60, b"GGGGCGGGGG"),
        read("r4", 96, None, 60, b"AAAGAAAAAA"),
        read("r5", 96, Some("C1"), 5, b"AAATAAAAAA"),
        Read {
            name: "r6",
            start: 97,
            cigar: vec![Cigar::Match(2), Cigar::Del(1), Cigar::Match(3)],
            barcode: Some("C2"),
            mapq: 60,
            seq: b"GGTTT",
        },
        read("r7", 295, Some("C1"), 60, b"CCCCTCCCCC"),
    ]
}

/// Coordinate-sorted `sample.bam` plus its BAI index.
pub(crate) fn write_bam(dir: &Path) -> PathBuf {
    let path = dir.join("sample.bam");

    let mut header = bam::header::Header::new();
    let mut chr_rec = bam::header::HeaderRecord::new(b"SQ");
    chr_rec.push_tag(b"SN", &CONTIG.to_string());
    chr_rec.push_tag(b"LN", &1000.to_string());
    header.push_record(&chr_rec);

    let mut writer = bam::Writer::from_path(&path, &header, bam::Format::Bam)
        .expect("Opened sample.bam for writing");
    for read in reads() {
        let mut record = bam::Record::new();
        let qual = vec![30; read.seq.len()];
        record.set(
            read.name.as_bytes(),
            Some(&CigarString(read.cigar)),
            read.seq,
            &qual,
        );
        record.set_flags(0);
        record.set_tid(0);
        record.set_pos(read.start);
        record.set_mapq(read.mapq);
        record.set_mtid(-1);
        record.set_mpos(-1);
        if let Some(barcode) = read.barcode {
            record
                .push_aux(b"CB", Aux::String(barcode))
                .expect("Added CB tag");
        }
        writer.write(&record).expect("Wrote to sample.bam");
    }
    drop(writer); // flush before indexing

    ensure_bam_index(&path, 1).expect("Indexed sample.bam");
    path
}

/// `variants.vcf` with one PASS, one `q10` and one unfiltered record.
pub(crate) fn write_vcf(dir: &Path) -> PathBuf {
    let path = dir.join("variants.vcf");

    let mut header = bcf::header::Header::new();
    header.push_record(format!("##contig=<ID={},length=1000>", CONTIG).as_bytes());
    header.push_record(br#"##FILTER=<ID=q10,Description="Quality below 10">"#);

    let mut writer = bcf::Writer::from_path(&path, &header, true, bcf::Format::Vcf)
        .expect("Opened variants.vcf for writing");
    let variants: [(i64, &str, &str, Option<&str>); 3] = [
        (99, "A", "G", Some("PASS")),
        (199, "C", "T", Some("q10")),
        (299, "G", "A", None),
    ];
    for (pos, reference, alternative, filter) in variants {
        let mut record = writer.empty_record();
        record.set_rid(Some(0));
        record.set_pos(pos);
        record
            .set_alleles(&[reference.as_bytes(), alternative.as_bytes()])
            .expect("Set alleles");
        if let Some(filter) = filter {
            record.push_filter(filter.as_bytes()).expect("Set FILTER");
        }
        writer.write(&record).expect("Wrote to variants.vcf");
    }
    drop(writer); // flush
    path
}
