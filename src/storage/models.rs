/// Last known content hash of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub path: String,
    pub hash: String,
    pub updated_at: String,
}
