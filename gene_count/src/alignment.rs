/// Alignment
///
/// The parts of a transcriptome alignment record used for counting
///
/// read_name - query name; consecutive records with the same name belong to one read
/// isoform - name of the reference sequence (transcript) the record aligns to
/// coord_tag - genomic projection of the alignment (XG tag by default), if present
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    read_name: String,
    isoform: String,
    coord_tag: Option<String>,
}

impl Alignment {
    pub fn new<S: Into<String>, T: Into<String>>(
        read_name: S,
        isoform: T,
        coord_tag: Option<String>,
    ) -> Self {
        Self {
            read_name: read_name.into(),
            isoform: isoform.into(),
            coord_tag,
        }
    }

    pub fn read_name(&self) -> &str {
        &self.read_name
    }

    pub fn isoform(&self) -> &str {
        &self.isoform
    }

    pub fn coord_tag(&self) -> Option<&str> {
        self.coord_tag.as_deref()
    }
}

/// All alignment records for a single read, in input order.  Never empty
pub type ReadGroup = Vec<Alignment>;
