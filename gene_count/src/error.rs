/// Failures that abort a counting run
///
/// Every one of these is fatal: the run stops at the first error and no attempt is made to
/// skip over bad records.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CountError {
    #[error("Could not load isoform to gene mapping from {source_name}: {reason}")]
    MappingLoad { source_name: String, reason: String },

    #[error("Isoform {isoform} is not present in the isoform to gene mapping")]
    UnknownIsoform { isoform: String },

    #[error("Alignment of read {read} to isoform {isoform} is missing the {tag} coordinate tag")]
    MissingCoordinateTag {
        read: String,
        isoform: String,
        tag: String,
    },

    #[error("Coordinate tag {tag} for read {read} does not have a string value")]
    InvalidCoordinateTag { read: String, tag: String },

    #[error("Alignment record without a read name")]
    MissingReadName,

    #[error(
        "Read {read} found in more than one block of records.  \
         Input must be sorted or grouped by read name"
    )]
    ReadOrder { read: String },
}
