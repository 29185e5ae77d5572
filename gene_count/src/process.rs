use anyhow::Context;

use crate::{
    alignment::Alignment,
    config::Config,
    counter::{GeneCounter, GeneCounts},
    group_reader::GroupReader,
    input::open_input,
    isoform_map::IsoformGeneMap,
    output::output_counts,
};

/// Strategy
///
/// Load the isoform to gene mapping, then make a single pass through the input
/// counting one read group at a time.  Finally write out the counts for all genes
/// in the mapping
pub fn count_genes(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let map = IsoformGeneMap::load(cfg.mapping_file())?;
    info!(
        "Read mapping for {} isoforms from {} genes",
        map.n_isoforms(),
        map.n_genes()
    );

    let mut rdr = open_input(cfg.input_file(), cfg.coord_tag())?;
    let counts = count_alignments(&map, rdr.by_ref(), cfg)
        .with_context(|| format!("Error counting reads from {}", cfg.input_file().display()))?;
    if rdr.n_unmapped() > 0 {
        info!("Skipped {} unmapped records", rdr.n_unmapped())
    }

    output_counts(cfg.output_file(), &map, &counts)
}

/// Group alignments by read and accumulate gene counts
pub fn count_alignments<I>(
    map: &IsoformGeneMap,
    alignments: I,
    cfg: &Config,
) -> anyhow::Result<GeneCounts>
where
    I: Iterator<Item = anyhow::Result<Alignment>>,
{
    let mut groups = GroupReader::new(alignments);
    if cfg.check_grouping() {
        groups = groups.with_order_check()
    }

    let mut ctr = GeneCounter::new(map, cfg.coord_tag());
    for group in groups.by_ref() {
        ctr.add_group(&group?)?
    }
    let counts = ctr.into_counts();

    debug!("Input split into {} read groups", groups.n_groups());
    info!(
        "Processed {} alignments from {} reads, of which {} were unique",
        groups.n_records(),
        counts.n_groups(),
        counts.n_unique_groups()
    );
    Ok(counts)
}
