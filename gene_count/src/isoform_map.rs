use std::{
    collections::{hash_map::Entry, BTreeSet, HashMap},
    io::BufRead,
    path::Path,
    sync::Arc,
};

use compress_io::compress::CompressIo;

use utils::get_next_line;

use crate::error::CountError;

/// Gene identifiers are shared between the mapping and the count tables
pub type Gene = Arc<str>;

/// IsoformGeneMap
///
/// Lookup from isoform (transcript) identifier to the gene that owns it.
/// Built once before counting starts and read only afterwards.
///
/// iso_hash - isoform -> gene
/// genes - distinct genes in lexicographic order; fixes the output row order
///
#[derive(Debug, Default)]
pub struct IsoformGeneMap {
    iso_hash: HashMap<Arc<str>, Gene>,
    genes: Vec<Gene>,
}

impl IsoformGeneMap {
    /// Read mapping from a (possibly compressed) tab separated file
    ///
    /// Expects at least two columns, isoform and gene.  Extra columns are ignored, as are blank
    /// lines and lines starting with '#'
    pub fn load<P: AsRef<Path>>(fname: P) -> anyhow::Result<Self> {
        let name = fname.as_ref().display().to_string();
        debug!("Reading in isoform to gene mapping from {}", name);

        trace!("Opening mapping file for reading");
        let rdr = CompressIo::new()
            .path(&fname)
            .bufreader()
            .map_err(|e| CountError::MappingLoad {
                source_name: name.clone(),
                reason: e.to_string(),
            })?;

        Self::from_reader(rdr, &name)
    }

    /// Parse mapping from any buffered reader.  `source_name` is only used in messages
    pub fn from_reader<R: BufRead>(mut rdr: R, source_name: &str) -> anyhow::Result<Self> {
        let load_err = |line: usize, reason: String| CountError::MappingLoad {
            source_name: source_name.to_owned(),
            reason: format!("line {}: {}", line, reason),
        };

        let mut buf = String::new();
        let mut line = 0;
        let mut iso_hash: HashMap<Arc<str>, Gene> = HashMap::new();
        let mut gene_set: BTreeSet<Gene> = BTreeSet::new();

        while let Some(fields) =
            get_next_line(&mut rdr, &mut buf).map_err(|e| load_err(line + 1, e.to_string()))?
        {
            line += 1;

            // Skip blank and comment lines
            if fields[0].is_empty() || fields[0].starts_with('#') {
                continue;
            }
            if fields.len() < 2 || fields[1].is_empty() {
                return Err(load_err(line, "expected isoform and gene columns".to_owned()).into());
            }

            let (iso, gene) = (fields[0], fields[1]);
            let gene = match gene_set.get(gene) {
                Some(g) => g.clone(),
                None => {
                    let g: Gene = Arc::from(gene);
                    gene_set.insert(g.clone());
                    g
                }
            };

            match iso_hash.entry(Arc::from(iso)) {
                Entry::Vacant(e) => {
                    e.insert(gene);
                }
                Entry::Occupied(e) => {
                    if *e.get() != gene {
                        return Err(load_err(
                            line,
                            format!(
                                "isoform {} assigned to both {} and {}",
                                iso,
                                e.get(),
                                gene
                            ),
                        )
                        .into());
                    }
                }
            }
        }

        debug!(
            "Finished reading in {} lines; found {} isoforms from {} genes",
            line,
            iso_hash.len(),
            gene_set.len()
        );

        Ok(Self {
            iso_hash,
            genes: gene_set.into_iter().collect(),
        })
    }

    /// Gene owning `isoform`
    pub fn gene_of(&self, isoform: &str) -> Result<&Gene, CountError> {
        self.iso_hash
            .get(isoform)
            .ok_or_else(|| CountError::UnknownIsoform {
                isoform: isoform.to_owned(),
            })
    }

    /// All distinct genes in lexicographic order
    pub fn sorted_genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn n_isoforms(&self) -> usize {
        self.iso_hash.len()
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING: &str = "iso3\tgeneB\n# comment\niso1\tgeneA\textra\n\niso2\tgeneA\n";

    fn load_str(s: &str) -> anyhow::Result<IsoformGeneMap> {
        IsoformGeneMap::from_reader(s.as_bytes(), "test")
    }

    fn load_err(s: &str) -> CountError {
        load_str(s)
            .unwrap_err()
            .downcast::<CountError>()
            .expect("expected CountError")
    }

    #[test]
    fn lookup_and_sorted_genes() {
        let map = load_str(MAPPING).unwrap();
        assert_eq!(map.n_isoforms(), 3);
        assert_eq!(map.n_genes(), 2);
        assert_eq!(&**map.gene_of("iso1").unwrap(), "geneA");
        assert_eq!(&**map.gene_of("iso2").unwrap(), "geneA");
        assert_eq!(&**map.gene_of("iso3").unwrap(), "geneB");
        let genes: Vec<&str> = map.sorted_genes().iter().map(|g| &**g).collect();
        assert_eq!(genes, ["geneA", "geneB"]);
    }

    #[test]
    fn isoforms_of_one_gene_share_identifier() {
        let map = load_str(MAPPING).unwrap();
        assert!(Arc::ptr_eq(
            map.gene_of("iso1").unwrap(),
            map.gene_of("iso2").unwrap()
        ));
    }

    #[test]
    fn unknown_isoform() {
        let map = load_str(MAPPING).unwrap();
        assert!(matches!(
            map.gene_of("iso99"),
            Err(CountError::UnknownIsoform { isoform }) if isoform == "iso99"
        ));
    }

    #[test]
    fn sort_is_lexicographic() {
        let map = load_str("a\tgene10\nb\tgene2\nc\tGene3\nd\tgene1\n").unwrap();
        let genes: Vec<&str> = map.sorted_genes().iter().map(|g| &**g).collect();
        assert_eq!(genes, ["Gene3", "gene1", "gene10", "gene2"]);
    }

    #[test]
    fn loading_twice_gives_same_result() {
        let m1 = load_str(MAPPING).unwrap();
        let m2 = load_str(MAPPING).unwrap();
        assert_eq!(m1.sorted_genes(), m2.sorted_genes());
        assert_eq!(m1.sorted_genes(), m1.sorted_genes());
        for iso in ["iso1", "iso2", "iso3"] {
            assert_eq!(m1.gene_of(iso).unwrap(), m2.gene_of(iso).unwrap());
        }
    }

    #[test]
    fn repeated_identical_row_is_accepted() {
        let map = load_str("iso1\tgeneA\niso1\tgeneA\n").unwrap();
        assert_eq!(map.n_isoforms(), 1);
    }

    #[test]
    fn conflicting_assignment_fails() {
        let e = load_err("iso1\tgeneA\niso1\tgeneB\n");
        assert!(
            matches!(&e, CountError::MappingLoad { reason, .. } if reason.starts_with("line 2")),
            "{}",
            e
        );
    }

    #[test]
    fn short_line_fails() {
        assert!(matches!(
            load_err("iso1\tgeneA\niso2\n"),
            CountError::MappingLoad { .. }
        ));
    }

    #[test]
    fn missing_file_fails() {
        let e = IsoformGeneMap::load("/nonexistent/path/to/mapping.txt")
            .unwrap_err()
            .downcast::<CountError>()
            .unwrap();
        assert!(matches!(e, CountError::MappingLoad { .. }));
    }

    #[test]
    fn empty_mapping() {
        let map = load_str("").unwrap();
        assert!(map.sorted_genes().is_empty());
    }
}
