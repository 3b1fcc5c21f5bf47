//! Fixed-capacity hash map keyed by 64-bit integers
//!
//! Open addressing with linear probing. Removal uses backward-shift deletion
//! instead of tombstones, so every probe chain stays contiguous and `get`
//! after `put` always finds the most recent value.
//!
//! Capacity never changes after creation. Inserting a new key into a full
//! table returns `CapacityExceeded`; overwriting an existing key always works.

use alloc::vec::Vec;

use crate::AllocError;

/// Fixed-capacity open-addressed map
pub struct FixedMap<V> {
    slots: Vec<Option<(u64, V)>>,
    len: usize,
}

impl<V> FixedMap<V> {
    /// Create a map holding at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, len: 0 }
    }

    /// Maximum number of entries
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Insert or overwrite.
    ///
    /// # Returns
    /// * `Ok(Some(old))` - key existed, value replaced
    /// * `Ok(None)` - new key inserted
    /// * `Err(AllocError::CapacityExceeded)` - new key, table full
    pub fn put(&mut self, key: u64, value: V) -> Result<Option<V>, AllocError> {
        if let Some(index) = self.find(key) {
            let slot = &mut self.slots[index];
            let old = slot.replace((key, value)).map(|(_, v)| v);
            return Ok(old);
        }

        if self.is_full() {
            return Err(AllocError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }

        let capacity = self.capacity();
        let mut index = self.home(key);
        while self.slots[index].is_some() {
            index = (index + 1) % capacity;
        }
        self.slots[index] = Some((key, value));
        self.len += 1;
        Ok(None)
    }

    /// Look up a value
    pub fn get(&self, key: u64) -> Option<&V> {
        self.find(key)
            .and_then(|index| self.slots[index].as_ref())
            .map(|(_, v)| v)
    }

    /// Look up a value mutably
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        let index = self.find(key)?;
        self.slots[index].as_mut().map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: u64) -> bool {
        self.find(key).is_some()
    }

    /// Remove an entry. Removing a missing key is a no-op.
    pub fn remove(&mut self, key: u64) -> Option<V> {
        let mut hole = self.find(key)?;
        let removed = self.slots[hole].take().map(|(_, v)| v);
        self.len -= 1;

        // Backward-shift every displaced entry that follows the hole
        let capacity = self.capacity();
        let mut next = (hole + 1) % capacity;
        loop {
            let home = match &self.slots[next] {
                Some((k, _)) => self.home(*k),
                None => break,
            };

            let stays = if hole <= next {
                hole < home && home <= next
            } else {
                hole < home || home <= next
            };

            if !stays {
                self.slots[hole] = self.slots[next].take();
                hole = next;
            }
            next = (next + 1) % capacity;
        }

        removed
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.len = 0;
    }

    /// Iterate over entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &V)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(k, v)| (*k, v)))
    }

    /// Iterate mutably over entries in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u64, &mut V)> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.as_mut().map(|(k, v)| (*k, v)))
    }

    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.iter_mut().map(|(_, v)| v)
    }

    fn find(&self, key: u64) -> Option<usize> {
        let capacity = self.capacity();
        if capacity == 0 {
            return None;
        }

        let mut index = self.home(key);
        for _ in 0..capacity {
            match &self.slots[index] {
                None => return None,
                Some((k, _)) if *k == key => return Some(index),
                Some(_) => index = (index + 1) % capacity,
            }
        }
        None
    }

    #[inline]
    fn home(&self, key: u64) -> usize {
        (mix(key) % self.capacity() as u64) as usize
    }
}

/// splitmix64 finalizer
#[inline]
fn mix(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;

    #[test]
    fn test_put_get_overwrite() {
        let mut map = FixedMap::with_capacity(4);
        assert_eq!(map.put(7, "a"), Ok(None));
        assert_eq!(map.get(7), Some(&"a"));

        assert_eq!(map.put(7, "b"), Ok(Some("a")));
        assert_eq!(map.get(7), Some(&"b"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut map = FixedMap::with_capacity(2);
        map.put(1, 10).unwrap();
        map.put(2, 20).unwrap();
        assert_eq!(
            map.put(3, 30),
            Err(AllocError::CapacityExceeded { capacity: 2 })
        );
        // Overwrite still allowed when full
        assert_eq!(map.put(2, 21), Ok(Some(20)));
        assert_eq!(map.get(3), None);
    }

    #[test]
    fn test_zero_capacity() {
        let mut map: FixedMap<u8> = FixedMap::with_capacity(0);
        assert!(map.get(1).is_none());
        assert!(map.remove(1).is_none());
        assert!(map.put(1, 1).is_err());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut map = FixedMap::with_capacity(4);
        map.put(1, 1).unwrap();
        assert_eq!(map.remove(99), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_keeps_probe_chains_reachable() {
        // Full table forces every key to share probe chains
        let mut map = FixedMap::with_capacity(8);
        for k in 0..8u64 {
            map.put(k * 8, k).unwrap();
        }
        for k in (0..8u64).step_by(2) {
            assert_eq!(map.remove(k * 8), Some(k));
        }
        for k in (1..8u64).step_by(2) {
            assert_eq!(map.get(k * 8), Some(&k), "lost key {}", k * 8);
        }
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_matches_reference_model() {
        let mut map = FixedMap::with_capacity(32);
        let mut model = BTreeMap::new();
        let mut seed: u64 = 42;

        for step in 0..5000u64 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let key = (seed >> 33) % 48;
            match seed % 4 {
                0 => {
                    assert_eq!(map.remove(key), model.remove(&key));
                }
                _ => {
                    let result = map.put(key, step);
                    if model.contains_key(&key) || model.len() < 32 {
                        assert_eq!(result.unwrap(), model.insert(key, step));
                    } else {
                        assert!(result.is_err());
                    }
                }
            }

            for k in 0..48 {
                assert_eq!(map.get(k), model.get(&k));
            }
            assert_eq!(map.len(), model.len());
        }
    }

    #[test]
    fn test_iteration_and_clear() {
        let mut map = FixedMap::with_capacity(8);
        for k in 1..=5u64 {
            map.put(k, k * 10).unwrap();
        }
        let mut keys: alloc::vec::Vec<u64> = map.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, [1, 2, 3, 4, 5]);

        for v in map.values_mut() {
            *v += 1;
        }
        assert_eq!(map.get(3), Some(&31));

        map.clear();
        assert!(map.is_empty());
        assert!(map.get(3).is_none());
    }
}
