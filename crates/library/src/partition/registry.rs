use super::bucket::Bucket;
use super::namer::Naming;
use crate::classify::BucketId;
use crate::lock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Run-wide map of buckets, created on first use.
#[derive(Debug)]
pub struct BucketRegistry {
    destination: PathBuf,
    naming: Naming,
    buckets: Mutex<HashMap<BucketId, Arc<Bucket>>>,
}

impl BucketRegistry {
    pub fn new(destination: impl Into<PathBuf>, naming: Naming) -> Self {
        Self { destination: destination.into(), naming, buckets: Mutex::new(HashMap::new()) }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The bucket for `id`, creating it if this is the first request. Every caller gets the same instance.
    pub fn get_or_create(&self, id: BucketId) -> Arc<Bucket> {
        let mut buckets = lock(&self.buckets);
        Arc::clone(buckets.entry(id).or_insert_with(|| {
            trace!(bucket = %id, "new bucket");
            Arc::new(Bucket::new(id, &self.destination, &self.naming))
        }))
    }

    /// All buckets created so far, ordered by id.
    pub fn buckets(&self) -> Vec<Arc<Bucket>> {
        let mut buckets: Vec<_> = lock(&self.buckets).values().cloned().collect();
        buckets.sort_by_key(|bucket| bucket.id());
        buckets
    }

    pub fn len(&self) -> usize {
        lock(&self.buckets).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Layout;
    use std::thread;

    fn registry() -> BucketRegistry {
        BucketRegistry::new(
            "/out",
            Naming {
                layout: Layout::Flatten,
                source_root: PathBuf::from("/media"),
                bucket_capacity: 100,
                false_positive_rate: 0.01,
            },
        )
    }

    #[test]
    fn test_same_instance() {
        let registry = registry();
        let year = BucketId::year(2014).unwrap();
        let first = registry.get_or_create(year);
        let second = registry.get_or_create(year);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_first_creation() {
        let registry = registry();
        let year = BucketId::year(1999).unwrap();
        let buckets: Vec<Arc<Bucket>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..16).map(|_| scope.spawn(|| registry.get_or_create(year))).collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });
        assert!(buckets.iter().all(|bucket| Arc::ptr_eq(bucket, &buckets[0])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_shared_namer_state() {
        let registry = registry();
        let year = BucketId::year(2020).unwrap();
        let a = registry.get_or_create(year).resolve(Path::new("/media/a/photo.jpg")).unwrap();
        let b = registry.get_or_create(year).resolve(Path::new("/media/b/photo.jpg")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_buckets_sorted() {
        let registry = registry();
        assert!(registry.is_empty());
        for year in [2020, 1999, 2005] {
            registry.get_or_create(BucketId::year(year).unwrap());
        }
        registry.get_or_create(BucketId::UNKNOWN);
        let ids: Vec<String> = registry.buckets().iter().map(|b| b.id().to_string()).collect();
        assert_eq!(ids, vec!["0", "1999", "2005", "2020"]);
    }
}
