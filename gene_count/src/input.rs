use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use anyhow::Context;
use noodles::{
    bam, sam,
    sam::alignment::{record::data::field::Tag, record_buf::data::field::Value, RecordBuf},
};

use crate::{alignment::Alignment, error::CountError};

// BAM files are BGZF (gzip) compressed
const BGZF_MAGIC: [u8; 2] = [0x1f, 0x8b];

// Common interface for the SAM and BAM readers
trait RecordSource {
    fn read_next(&mut self, header: &sam::Header, rec: &mut RecordBuf) -> io::Result<usize>;
}

impl<R: BufRead> RecordSource for sam::io::Reader<R> {
    fn read_next(&mut self, header: &sam::Header, rec: &mut RecordBuf) -> io::Result<usize> {
        self.read_record_buf(header, rec)
    }
}

impl<R: Read> RecordSource for bam::io::Reader<R> {
    fn read_next(&mut self, header: &sam::Header, rec: &mut RecordBuf) -> io::Result<usize> {
        self.read_record_buf(header, rec)
    }
}

/// AlignmentReader
///
/// Reads SAM or BAM records from a file and returns the mapped records as Alignments.
/// Unmapped records are skipped (and counted).
///
pub struct AlignmentReader {
    name: PathBuf,
    inner: Box<dyn RecordSource>,
    header: sam::Header,
    record: RecordBuf,
    tag: Tag,
    tag_name: String,
    n_unmapped: usize,
    done: bool,
}

/// Open SAM or BAM file.  The format is detected from the file contents.
/// `tag` is the two character name of the genomic coordinate tag
pub fn open_input<P: AsRef<Path>>(name: P, tag: &str) -> anyhow::Result<AlignmentReader> {
    let name = name.as_ref();
    debug!("Try to open input file {}", name.display());

    let tag_bytes = tag.as_bytes();
    if tag_bytes.len() != 2 {
        return Err(anyhow!("Illegal tag name {}", tag));
    }

    let mut rdr = BufReader::new(
        File::open(name).with_context(|| format!("Failed to open input file {}", name.display()))?,
    );
    let is_bam = rdr
        .fill_buf()
        .with_context(|| format!("Error reading from input file {}", name.display()))?
        .starts_with(&BGZF_MAGIC);

    let (inner, header) = if is_bam {
        debug!("Reading {} as BAM", name.display());
        let mut r = bam::io::Reader::new(rdr);
        let header = r
            .read_header()
            .with_context(|| format!("Error reading BAM header from {}", name.display()))?;
        (Box::new(r) as Box<dyn RecordSource>, header)
    } else {
        debug!("Reading {} as SAM", name.display());
        let mut r = sam::io::Reader::new(rdr);
        let header = r
            .read_header()
            .with_context(|| format!("Error reading SAM header from {}", name.display()))?;
        (Box::new(r) as Box<dyn RecordSource>, header)
    };

    debug!(
        "Input header has {} reference sequences",
        header.reference_sequences().len()
    );

    Ok(AlignmentReader {
        name: name.to_owned(),
        inner,
        header,
        record: RecordBuf::default(),
        tag: Tag::new(tag_bytes[0], tag_bytes[1]),
        tag_name: tag.to_owned(),
        n_unmapped: 0,
        done: false,
    })
}

impl AlignmentReader {
    pub fn n_unmapped(&self) -> usize {
        self.n_unmapped
    }

    // Extract alignment from current record.  Returns None for unmapped records
    fn alignment(&self) -> anyhow::Result<Option<Alignment>> {
        let rec = &self.record;
        if rec.flags().is_unmapped() {
            return Ok(None);
        }
        let read_name = rec
            .name()
            .map(|n| n.to_string())
            .ok_or(CountError::MissingReadName)?;

        let id = match rec.reference_sequence_id() {
            Some(id) => id,
            None => return Ok(None),
        };
        let isoform = self
            .header
            .reference_sequences()
            .get_index(id)
            .map(|(s, _)| s.to_string())
            .ok_or_else(|| {
                anyhow!(
                    "Reference sequence {} for read {} not found in header",
                    id,
                    read_name
                )
            })?;

        let coord_tag = match rec.data().get(&self.tag) {
            None => None,
            Some(Value::String(s)) => Some(s.to_string()),
            Some(Value::Character(c)) => Some(char::from(*c).to_string()),
            Some(_) => {
                return Err(CountError::InvalidCoordinateTag {
                    read: read_name,
                    tag: self.tag_name.clone(),
                }
                .into())
            }
        };

        Ok(Some(Alignment::new(read_name, isoform, coord_tag)))
    }
}

impl Iterator for AlignmentReader {
    type Item = anyhow::Result<Alignment>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.inner.read_next(&self.header, &mut self.record) {
                Ok(0) => {
                    debug!("End of input from {}", self.name.display());
                    self.done = true
                }
                Ok(_) => match self.alignment() {
                    Ok(Some(a)) => return Some(Ok(a)),
                    Ok(None) => self.n_unmapped += 1,
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                },
                Err(e) => {
                    self.done = true;
                    return Some(Err(anyhow::Error::new(e).context(format!(
                        "Error reading record from {}",
                        self.name.display()
                    ))));
                }
            }
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use noodles::sam::alignment::io::Write as _;

    use super::*;

    pub(crate) const SAM_HEADER: &str = "@HD\tVN:1.6\tSO:queryname\n\
        @SQ\tSN:iso1\tLN:1000\n\
        @SQ\tSN:iso2\tLN:1000\n\
        @SQ\tSN:iso3\tLN:1000\n\
        @SQ\tSN:iso99\tLN:1000\n";

    /// SAM line for a mapped read with an optional tag field
    pub(crate) fn sam_line(read: &str, flag: u16, iso: &str, tag: Option<&str>) -> String {
        let mut s = format!(
            "{}\t{}\t{}\t100\t255\t4M\t*\t0\t0\tACGT\t*",
            read, flag, iso
        );
        if let Some(t) = tag {
            s.push('\t');
            s.push_str(t);
        }
        s.push('\n');
        s
    }

    /// Write `SAM_HEADER` and the SAM records in `body` to `path` as a BAM file
    pub(crate) fn write_bam(path: &Path, body: &str) -> anyhow::Result<()> {
        let text = format!("{}{}", SAM_HEADER, body);
        let mut rdr = sam::io::Reader::new(text.as_bytes());
        let header = rdr.read_header()?;
        let mut wrt = bam::io::Writer::new(File::create(path)?);
        wrt.write_header(&header)?;
        for rec in rdr.record_bufs(&header) {
            wrt.write_alignment_record(&header, &rec?)?;
        }
        wrt.try_finish()?;
        Ok(())
    }

    fn read_all(body: &str) -> anyhow::Result<(Vec<Alignment>, usize)> {
        let dir = tempfile::tempdir()?;
        let p = dir.path().join("input.sam");
        std::fs::write(&p, format!("{}{}", SAM_HEADER, body))?;
        let mut rdr = open_input(&p, "XG")?;
        let v = rdr.by_ref().collect::<anyhow::Result<Vec<_>>>()?;
        Ok((v, rdr.n_unmapped()))
    }

    #[test]
    fn reads_mapped_records() {
        let body = [
            sam_line("r1", 0, "iso1", Some("XG:Z:chr1:100")),
            sam_line("r1", 256, "iso2", Some("XG:Z:chr1:100")),
            "r2\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*\n".to_owned(),
            sam_line("r3", 0, "iso3", Some("XG:A:+")),
            sam_line("r4", 0, "iso3", None),
        ]
        .concat();
        let (v, n_unmapped) = read_all(&body).unwrap();
        assert_eq!(
            v,
            [
                Alignment::new("r1", "iso1", Some("chr1:100".to_owned())),
                Alignment::new("r1", "iso2", Some("chr1:100".to_owned())),
                Alignment::new("r3", "iso3", Some("+".to_owned())),
                Alignment::new("r4", "iso3", None),
            ]
        );
        assert_eq!(n_unmapped, 1);
    }

    #[test]
    fn bam_input_matches_sam() {
        let body = [
            sam_line("r1", 0, "iso1", Some("XG:Z:chr1:100")),
            sam_line("r1", 256, "iso2", Some("XG:Z:chr1:100")),
            "r2\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*\n".to_owned(),
            sam_line("r3", 0, "iso3", Some("XG:A:+")),
            sam_line("r4", 0, "iso3", None),
        ]
        .concat();
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("input.bam");
        write_bam(&p, &body).unwrap();
        assert!(std::fs::read(&p).unwrap().starts_with(&BGZF_MAGIC));

        let mut rdr = open_input(&p, "XG").unwrap();
        let v = rdr.by_ref().collect::<anyhow::Result<Vec<_>>>().unwrap();
        let (from_sam, _) = read_all(&body).unwrap();
        assert_eq!(v, from_sam);
        assert_eq!(v.len(), 4);
        assert_eq!(rdr.n_unmapped(), 1);
    }

    #[test]
    fn non_string_tag_fails() {
        let body = sam_line("r1", 0, "iso1", Some("XG:i:100"));
        let e = read_all(&body).unwrap_err();
        assert_eq!(
            e.downcast::<CountError>().unwrap(),
            CountError::InvalidCoordinateTag {
                read: "r1".to_owned(),
                tag: "XG".to_owned()
            }
        );
    }

    #[test]
    fn other_tags_are_ignored() {
        let body = sam_line("r1", 0, "iso1", Some("NH:i:2\tXG:Z:chr2:5"));
        let (v, _) = read_all(&body).unwrap();
        assert_eq!(v[0].coord_tag(), Some("chr2:5"));
    }

    #[test]
    fn bad_tag_name() {
        assert!(open_input("unused.sam", "XGX").is_err());
    }

    #[test]
    fn missing_input_file() {
        assert!(open_input("/nonexistent/input.bam", "XG").is_err());
    }
}
