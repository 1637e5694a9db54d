// Standard library imports
use std::{collections::HashMap, hash::Hash};

// Third party imports
use tokio::sync::RwLock;

/// Cache bất đồng bộ trong bộ nhớ, không giới hạn và không hết hạn.
///
/// Chỉ phù hợp khi số lượng khóa nhỏ và bị chặn (ví dụ: tập IP của tối đa
/// vài chục node). Vòng đời gắn với đối tượng sở hữu nó.
#[derive(Debug)]
pub struct MemoryCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for MemoryCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Tạo cache mới
    pub fn new() -> Self {
        Self::default()
    }

    /// Lấy giá trị từ cache
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.read().await.get(key).cloned()
    }

    /// Lưu giá trị vào cache
    pub async fn insert(&self, key: K, value: V) {
        self.entries.write().await.insert(key, value);
    }

    /// Xóa một giá trị khỏi cache
    pub async fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.write().await.remove(key)
    }

    /// Xóa toàn bộ cache
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Lấy số lượng phần tử trong cache
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Cache có rỗng không
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cache() {
        let cache: MemoryCache<String, u32> = MemoryCache::new();
        assert!(cache.is_empty().await);

        // Test thêm và lấy
        cache.insert("a".to_string(), 1).await;
        cache.insert("b".to_string(), 2).await;
        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.len().await, 2);

        // Ghi đè
        cache.insert("a".to_string(), 10).await;
        assert_eq!(cache.get("a").await, Some(10));

        // Test xóa
        assert_eq!(cache.remove("a").await, Some(10));
        assert_eq!(cache.get("a").await, None);

        // Test clear
        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
