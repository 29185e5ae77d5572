use std::collections::HashSet;

use crate::{
    alignment::{Alignment, ReadGroup},
    error::CountError,
};

/// GroupReader
///
/// Turns a stream of alignments into a stream of read groups, one per read.
///
/// Records for a read must be adjacent in the input (i.e., the input is sorted or grouped by
/// read name).  The reader only looks for changes in the read name; if the input is not
/// grouped, a read will be split into several groups.  With the optional order check the
/// names of all finished groups are kept so that this case is reported as an error.
///
/// An error from the underlying stream is returned in place of the next group and ends
/// iteration.
pub struct GroupReader<I> {
    inner: I,
    pending: Option<Alignment>,
    closed_reads: Option<HashSet<String>>,
    finished: bool,
    n_records: usize,
    n_groups: usize,
}

impl<I> GroupReader<I>
where
    I: Iterator<Item = anyhow::Result<Alignment>>,
{
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            pending: None,
            closed_reads: None,
            finished: false,
            n_records: 0,
            n_groups: 0,
        }
    }

    /// Fail if a read name turns up again after its group has been closed
    pub fn with_order_check(mut self) -> Self {
        self.closed_reads = Some(HashSet::new());
        self
    }

    pub fn n_records(&self) -> usize {
        self.n_records
    }

    pub fn n_groups(&self) -> usize {
        self.n_groups
    }

    // Next alignment from the underlying stream.  Errors finish the iteration
    fn next_alignment(&mut self) -> Option<anyhow::Result<Alignment>> {
        match self.inner.next() {
            Some(Ok(a)) => {
                self.n_records += 1;
                Some(Ok(a))
            }
            Some(Err(e)) => {
                self.finished = true;
                Some(Err(e))
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

impl<I> Iterator for GroupReader<I>
where
    I: Iterator<Item = anyhow::Result<Alignment>>,
{
    type Item = anyhow::Result<ReadGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.pending.take() {
            Some(a) => a,
            None if self.finished => return None,
            None => match self.next_alignment()? {
                Ok(a) => a,
                Err(e) => return Some(Err(e)),
            },
        };

        if let Some(closed) = self.closed_reads.as_ref() {
            if closed.contains(first.read_name()) {
                self.finished = true;
                return Some(Err(CountError::ReadOrder {
                    read: first.read_name().to_owned(),
                }
                .into()));
            }
        }

        let mut group = vec![first];
        while !self.finished {
            match self.next_alignment() {
                Some(Ok(a)) if a.read_name() == group[0].read_name() => group.push(a),
                Some(Ok(a)) => {
                    self.pending = Some(a);
                    break;
                }
                Some(Err(e)) => return Some(Err(e)),
                None => break,
            }
        }

        if let Some(closed) = self.closed_reads.as_mut() {
            closed.insert(group[0].read_name().to_owned());
        }
        self.n_groups += 1;
        trace!(
            "Read {} has {} alignment(s)",
            group[0].read_name(),
            group.len()
        );
        Some(Ok(group))
    }
}
