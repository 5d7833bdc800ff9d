//! Sequence I/O Module
//!
//! Reads the protein catalog produced by the gene caller (FASTA, plain or
//! gzip-compressed) and writes FASTA subsets.
//!
//! # Contig Derivation
//! Prodigal-style protein headers look like `>k141_2152_2 # 3 # 188 # 1 # ...`.
//! The originating contig is taken as the first `_`-delimited token of the
//! header's first whitespace token (`k141` above). Downstream taxonomy lookup
//! depends on this rule, so it is applied verbatim.
//!
//! # Examples
//! ```no_run
//! use peptominer::seqio::FastaFile;
//!
//! let mut reader = FastaFile::open("proteins.faa.gz").unwrap();
//! while let Some(record) = reader.read_next().unwrap() {
//!     println!("{}: {} aa", record.name, record.seq.len());
//! }
//! ```

use flate2::read::MultiGzDecoder;
use log::debug;
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{open_input, PeptideError, Result};
use crate::lookup::{build_lookup, Lookup};

// ============================================================================
// FASTA Format
// ============================================================================

/// A FASTA record.
#[derive(Debug, Clone, PartialEq)]
pub struct FastaRecord {
    /// Text after '>' up to the first whitespace.
    pub name: String,
    /// Full header text after '>', trimmed.
    pub description: String,
    /// Residues concatenated from all sequence lines.
    pub seq: String,
}

/// Sequential FASTA reader over any byte source.
///
/// Use `FastaReader<File>` for plain files or
/// `FastaReader<MultiGzDecoder<File>>` for gzipped files.
pub struct FastaReader<R: Read> {
    reader: BufReader<R>,
    path: PathBuf,
    line_buf: String,
    current_header: Option<String>,
}

impl FastaReader<File> {
    /// Opens a plain FASTA file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_input(path)?;
        Self::new(file, path)
    }
}

impl FastaReader<MultiGzDecoder<File>> {
    /// Opens a gzip-compressed FASTA file.
    pub fn open_gz<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_input(path)?;
        Self::new(MultiGzDecoder::new(file), path)
    }
}

impl<R: Read> FastaReader<R> {
    /// Wraps `source`; `path` is used in error messages only.
    pub fn new<P: AsRef<Path>>(source: R, path: P) -> Result<Self> {
        let mut reader = Self {
            reader: BufReader::with_capacity(1024 * 1024, source),
            path: path.as_ref().to_path_buf(),
            line_buf: String::with_capacity(256),
            current_header: None,
        };

        // Skip anything before the first header
        loop {
            if !reader.fill_line()? {
                break;
            }
            if let Some(header) = reader.line_buf.strip_prefix('>') {
                reader.current_header = Some(header.trim().to_string());
                break;
            }
        }

        Ok(reader)
    }

    fn fill_line(&mut self) -> Result<bool> {
        self.line_buf.clear();
        let n = self
            .reader
            .read_line(&mut self.line_buf)
            .map_err(|e| PeptideError::io(&self.path, e))?;
        Ok(n > 0)
    }

    /// Reads the next FASTA record.
    ///
    /// # Returns
    /// - `Ok(Some(record))` - Successfully read a record
    /// - `Ok(None)` - End of file reached
    /// - `Err(e)` - I/O error occurred
    pub fn read_next(&mut self) -> Result<Option<FastaRecord>> {
        let description = match self.current_header.take() {
            Some(h) => h,
            None => return Ok(None),
        };

        let mut seq = String::with_capacity(512);

        while self.fill_line()? {
            if let Some(header) = self.line_buf.strip_prefix('>') {
                self.current_header = Some(header.trim().to_string());
                break;
            }
            seq.push_str(self.line_buf.trim_end());
        }

        let name = description
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        Ok(Some(FastaRecord { name, description, seq }))
    }
}

impl<R: Read> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Auto-detecting FASTA file reader.
///
/// Files ending in `.gz` are opened with gzip decompression.
pub enum FastaFile {
    Plain(FastaReader<File>),
    Gzipped(FastaReader<MultiGzDecoder<File>>),
}

impl FastaFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        if ext == "gz" {
            Ok(FastaFile::Gzipped(FastaReader::open_gz(path)?))
        } else {
            Ok(FastaFile::Plain(FastaReader::open(path)?))
        }
    }

    pub fn read_next(&mut self) -> Result<Option<FastaRecord>> {
        match self {
            FastaFile::Plain(r) => r.read_next(),
            FastaFile::Gzipped(r) => r.read_next(),
        }
    }
}

impl Iterator for FastaFile {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FastaFile::Plain(r) => r.next(),
            FastaFile::Gzipped(r) => r.next(),
        }
    }
}

// ============================================================================
// Protein Catalog
// ============================================================================

/// A predicted protein and the contig it was called on.
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinRecord {
    pub id: String,
    pub contig: String,
    pub sequence: String,
}

impl ProteinRecord {
    /// Builds a record from a FASTA header (without '>') and its sequence.
    pub fn from_header(description: &str, sequence: String) -> Self {
        let id = description.split_whitespace().next().unwrap_or("");
        Self {
            id: id.to_string(),
            contig: contig_of(id).to_string(),
            sequence,
        }
    }
}

impl From<FastaRecord> for ProteinRecord {
    fn from(record: FastaRecord) -> Self {
        ProteinRecord::from_header(&record.description, record.seq)
    }
}

/// First `_`-delimited token of a protein identifier.
pub fn contig_of(protein_id: &str) -> &str {
    protein_id.split('_').next().unwrap_or(protein_id)
}

/// Loads the protein catalog keyed by protein id (last record wins).
pub fn load_protein_catalog<P: AsRef<Path>>(path: P) -> Result<Lookup<ProteinRecord>> {
    let reader = FastaFile::open(path.as_ref())?;
    build_lookup(
        reader.map(|r| r.map(ProteinRecord::from)),
        |p| p.id.as_str(),
        "protein catalog",
    )
}

// ============================================================================
// FASTA Output
// ============================================================================

/// Copies records of `source` whose name is in `ids` to `writer`, preserving
/// catalog order and the original header text.
///
/// # Returns
/// Number of records written.
pub fn write_fasta_subset<W: Write>(
    source: &Path,
    ids: &FxHashSet<String>,
    writer: &mut W,
    out_path: &Path,
) -> Result<usize> {
    let mut written = 0usize;
    for record in FastaFile::open(source)? {
        let record = record?;
        if ids.contains(&record.name) {
            writeln!(writer, ">{}", record.description).map_err(|e| PeptideError::io(out_path, e))?;
            writeln!(writer, "{}", record.seq).map_err(|e| PeptideError::io(out_path, e))?;
            written += 1;
        }
    }
    debug!("{}: {} of {} accepted ids present", source.display(), written, ids.len());
    Ok(written)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Cursor;

    const CATALOG: &str = ">k141_2152_2 # 3 # 188 # 1 # ID=1_2\n\
        MKVLAA\n\
        GLLK\n\
        >k141_99_1 # 1 # 90 # -1\n\
        MSTNPK\n";

    #[test]
    fn test_read_multiline_records() {
        let reader = FastaReader::new(Cursor::new(CATALOG), "mem.faa").unwrap();
        let records: Vec<FastaRecord> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "k141_2152_2");
        assert_eq!(records[0].description, "k141_2152_2 # 3 # 188 # 1 # ID=1_2");
        assert_eq!(records[0].seq, "MKVLAAGLLK");
        assert_eq!(records[1].seq, "MSTNPK");
    }

    #[test]
    fn test_preamble_before_first_header_ignored() {
        let data = "\n; comment\n>p1\nMK\n";
        let reader = FastaReader::new(Cursor::new(data), "mem.faa").unwrap();
        let records: Vec<FastaRecord> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "p1");
    }

    #[test]
    fn test_empty_input() {
        let mut reader = FastaReader::new(Cursor::new(""), "mem.faa").unwrap();
        assert!(reader.read_next().unwrap().is_none());
    }

    #[test]
    fn test_contig_of() {
        assert_eq!(contig_of("k141_2152_2"), "k141");
        assert_eq!(contig_of("NODE"), "NODE");
        assert_eq!(contig_of(""), "");
    }

    #[test]
    fn test_protein_record_from_fasta() {
        let rec = FastaRecord {
            name: "k141_2152_2".into(),
            description: "k141_2152_2 # 3 # 188".into(),
            seq: "MKV".into(),
        };
        let protein = ProteinRecord::from(rec);
        assert_eq!(protein.id, "k141_2152_2");
        assert_eq!(protein.contig, "k141");
        assert_eq!(protein.sequence, "MKV");
    }

    #[test]
    fn test_load_catalog_plain_and_gz() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("proteins.faa");
        std::fs::write(&plain, CATALOG).unwrap();
        let table = load_protein_catalog(&plain).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["k141_99_1"].contig, "k141");

        let gz = dir.path().join("proteins.faa.gz");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        enc.write_all(CATALOG.as_bytes()).unwrap();
        enc.finish().unwrap();
        let table_gz = load_protein_catalog(&gz).unwrap();
        assert_eq!(table_gz, table);
    }

    #[test]
    fn test_duplicate_protein_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.faa");
        std::fs::write(&path, ">p_1\nAAA\n>p_1\nCCC\n").unwrap();
        let table = load_protein_catalog(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["p_1"].sequence, "CCC");
    }

    #[test]
    fn test_missing_catalog() {
        let err = load_protein_catalog("/nonexistent/proteins.faa").unwrap_err();
        assert!(matches!(err, PeptideError::MissingInput { .. }));
    }

    #[test]
    fn test_write_fasta_subset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peptides.faa");
        std::fs::write(&path, CATALOG).unwrap();

        let ids: FxHashSet<String> = ["k141_99_1".to_string(), "absent".to_string()].into_iter().collect();
        let mut out = Vec::new();
        let n = write_fasta_subset(&path, &ids, &mut out, Path::new("out.faa")).unwrap();
        assert_eq!(n, 1);
        assert_eq!(String::from_utf8(out).unwrap(), ">k141_99_1 # 1 # 90 # -1\nMSTNPK\n");
    }
}
