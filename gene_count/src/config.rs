use std::path::{Path, PathBuf};

/// Default name of the genomic coordinate tag
pub const DEFAULT_COORD_TAG: &str = "XG";

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// mapping_file - tab separated isoform to gene mapping
/// input_file - SAM/BAM file of alignments to the transcriptome, grouped by read name
/// output_file - destination for the gene counts
/// coord_tag - name of the tag holding the genomic coordinates of an alignment
/// check_grouping - fail if records for a read are not adjacent in the input
///
pub struct Config {
    mapping_file: PathBuf,
    input_file: PathBuf,
    output_file: PathBuf,
    coord_tag: String,
    check_grouping: bool,
}

impl Config {
    pub fn new(mapping_file: PathBuf, input_file: PathBuf, output_file: PathBuf) -> Self {
        Self {
            mapping_file,
            input_file,
            output_file,
            coord_tag: DEFAULT_COORD_TAG.to_owned(),
            check_grouping: false,
        }
    }

    pub fn set_coord_tag(&mut self, tag: String) {
        self.coord_tag = tag
    }

    pub fn set_check_grouping(&mut self, flag: bool) {
        self.check_grouping = flag
    }

    pub fn mapping_file(&self) -> &Path {
        &self.mapping_file
    }

    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn coord_tag(&self) -> &str {
        &self.coord_tag
    }

    pub fn check_grouping(&self) -> bool {
        self.check_grouping
    }
}
