use std::{
    collections::{HashMap, HashSet},
    io::Write,
};

use anyhow::Context;

use crate::{
    alignment::Alignment,
    error::CountError,
    isoform_map::{Gene, IsoformGeneMap},
};

/// GeneCounts
///
/// Per gene tallies of reads.  Genes not present in a table have a count of 0
///
/// total - reads with at least one alignment to an isoform of the gene
/// unique - the subset of those reads where all alignments share the same genomic coordinates
/// n_groups, n_unique_groups - number of reads seen, and how many of them were unique
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneCounts {
    total: HashMap<Gene, u64>,
    unique: HashMap<Gene, u64>,
    n_groups: u64,
    n_unique_groups: u64,
}

impl GeneCounts {
    pub fn total(&self, gene: &str) -> u64 {
        self.total.get(gene).copied().unwrap_or(0)
    }

    pub fn unique(&self, gene: &str) -> u64 {
        self.unique.get(gene).copied().unwrap_or(0)
    }

    pub fn n_groups(&self) -> u64 {
        self.n_groups
    }

    pub fn n_unique_groups(&self) -> u64 {
        self.n_unique_groups
    }

    /// Add counts from another set of tallies (e.g., from a different part of the input)
    pub fn merge(&mut self, other: GeneCounts) {
        for (g, n) in other.total {
            *self.total.entry(g).or_insert(0) += n
        }
        for (g, n) in other.unique {
            *self.unique.entry(g).or_insert(0) += n
        }
        self.n_groups += other.n_groups;
        self.n_unique_groups += other.n_unique_groups;
    }

    /// Write one line per gene in `map` with the gene name and the total and unique counts.
    /// Lines are in the sort order of the gene names
    pub fn write_table<W: Write>(
        &self,
        map: &IsoformGeneMap,
        wrt: &mut W,
    ) -> anyhow::Result<()> {
        for gene in map.sorted_genes() {
            writeln!(
                wrt,
                "{}\t{}\t{}",
                gene,
                self.total(gene),
                self.unique(gene)
            )?
        }
        Ok(())
    }
}

/// A read is unique if every one of its alignments carries the same coordinate tag, so
/// alignments to several isoforms projecting back to the same genomic location still count
/// as unique.  Tags are compared to the previous record only; as the flag is never reset
/// this is the same as requiring that all tags are equal.
struct CoordTags<'b> {
    tag: &'b str,
    prev: Option<&'b str>,
    unique: bool,
}

impl<'b> CoordTags<'b> {
    fn new(tag: &'b str) -> Self {
        Self {
            tag,
            prev: None,
            unique: true,
        }
    }

    fn add(&mut self, aln: &'b Alignment) -> Result<(), CountError> {
        let coords = aln
            .coord_tag()
            .ok_or_else(|| CountError::MissingCoordinateTag {
                read: aln.read_name().to_owned(),
                isoform: aln.isoform().to_owned(),
                tag: self.tag.to_owned(),
            })?;
        if matches!(self.prev, Some(p) if p != coords) {
            self.unique = false
        }
        self.prev = Some(coords);
        Ok(())
    }
}

/// GeneCounter
///
/// Accumulates read groups into GeneCounts
///
pub struct GeneCounter<'a> {
    map: &'a IsoformGeneMap,
    tag: &'a str,
    counts: GeneCounts,
}

impl<'a> GeneCounter<'a> {
    /// `tag` is the name of the coordinate tag, used in error messages
    pub fn new(map: &'a IsoformGeneMap, tag: &'a str) -> Self {
        Self {
            map,
            tag,
            counts: GeneCounts::default(),
        }
    }

    /// Count one read.  Each gene hit by the read is counted once, however many of its
    /// isoforms the read aligns to.  Records are checked in order, the isoform first and
    /// then the coordinate tag, so the first bad record determines the error
    pub fn add_group(&mut self, group: &[Alignment]) -> anyhow::Result<()> {
        let map = self.map;
        let mut genes: HashSet<&Gene> = HashSet::with_capacity(group.len());
        let mut coords = CoordTags::new(self.tag);
        for aln in group {
            let gene = map
                .gene_of(aln.isoform())
                .with_context(|| format!("Error processing read {}", aln.read_name()))?;
            genes.insert(gene);
            coords.add(aln)?;
        }
        let unique = coords.unique;

        let counts = &mut self.counts;
        for gene in genes {
            *counts.total.entry(gene.clone()).or_insert(0) += 1;
            if unique {
                *counts.unique.entry(gene.clone()).or_insert(0) += 1;
            }
        }
        counts.n_groups += 1;
        if unique {
            counts.n_unique_groups += 1;
        }
        Ok(())
    }

    pub fn into_counts(self) -> GeneCounts {
        self.counts
    }
}
