use std::{io::Write, path::Path};

use anyhow::Context;
use compress_io::{compress::CompressIo, compress_type::CompressType};

use crate::{counter::GeneCounts, isoform_map::IsoformGeneMap};

/// Write gene counts table to `path`, replacing any existing file.  The table is always
/// plain text, whatever the extension of `path`
pub fn output_counts(
    path: &Path,
    map: &IsoformGeneMap,
    counts: &GeneCounts,
) -> anyhow::Result<()> {
    debug!(
        "Writing counts for {} genes to {}",
        map.n_genes(),
        path.display()
    );
    let mut wrt = CompressIo::new()
        .path(path)
        .ctype(CompressType::NoFilter)
        .bufwriter()
        .with_context(|| format!("problem creating output file {}", path.display()))?;
    counts
        .write_table(map, &mut wrt)
        .with_context(|| format!("Error writing gene counts to {}", path.display()))?;
    wrt.flush()
        .with_context(|| format!("Error writing gene counts to {}", path.display()))
}
