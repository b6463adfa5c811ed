//! Static mapping from bucket names to metadata tables.

use crate::error::CatalogError;

/// The three logical buckets served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    Uploaded,
    Processed,
    Anonymized,
}

impl BucketKind {
    /// All kinds in home page order.
    pub const ALL: [BucketKind; 3] = [
        BucketKind::Uploaded,
        BucketKind::Processed,
        BucketKind::Anonymized,
    ];

    /// Suffix appended to the base name to form the bucket name.
    pub fn suffix(self) -> &'static str {
        match self {
            BucketKind::Uploaded => "",
            BucketKind::Processed => "-processed",
            BucketKind::Anonymized => "-anonymized",
        }
    }

    /// Metadata table recording events for this bucket.
    pub fn table(self) -> &'static str {
        match self {
            BucketKind::Uploaded => "images_uploaded",
            BucketKind::Processed => "images_processed",
            BucketKind::Anonymized => "images_anonymized",
        }
    }
}

/// Fixed catalog of the three configured buckets.
///
/// Built once at startup from the base bucket name and shared read-only
/// across requests.
#[derive(Debug, Clone)]
pub struct BucketCatalog {
    names: [String; 3],
}

impl BucketCatalog {
    /// Derive the three bucket names from `base`.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let names = BucketKind::ALL.map(|kind| format!("{}{}", base, kind.suffix()));
        Self { names }
    }

    /// The bucket name for a kind.
    pub fn bucket_name(&self, kind: BucketKind) -> &str {
        &self.names[Self::index(kind)]
    }

    /// The configured bucket names in home page order.
    pub fn bucket_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Look up which kind a bucket name refers to.
    pub fn kind_of(&self, bucket: &str) -> Result<BucketKind, CatalogError> {
        BucketKind::ALL
            .into_iter()
            .find(|kind| self.bucket_name(*kind) == bucket)
            .ok_or_else(|| CatalogError::UnknownBucket {
                bucket: bucket.to_string(),
            })
    }

    /// Metadata table for a bucket name.
    pub fn table_for(&self, bucket: &str) -> Result<&'static str, CatalogError> {
        self.kind_of(bucket).map(BucketKind::table)
    }

    fn index(kind: BucketKind) -> usize {
        match kind {
            BucketKind::Uploaded => 0,
            BucketKind::Processed => 1,
            BucketKind::Anonymized => 2,
        }
    }
}
