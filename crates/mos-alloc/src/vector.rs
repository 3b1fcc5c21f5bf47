//! Growable vector with explicit doubling growth

use alloc::vec::Vec;

const MIN_CAPACITY: usize = 4;

/// Contiguous growable vector.
///
/// Growth is explicit: when full, capacity doubles (minimum 4). Removal keeps
/// the relative order of the remaining elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vector<T> {
    items: Vec<T>,
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Vector<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: T) {
        if self.items.len() == self.items.capacity() {
            let target = (self.items.capacity() * 2).max(MIN_CAPACITY);
            self.items.reserve_exact(target - self.items.len());
        }
        self.items.push(value);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Remove the element at `index`, shifting later elements down
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Move the element at `index` to the end, keeping everything else in order
    pub fn move_to_end(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items[index..].rotate_left(1);
        true
    }

    pub fn position<P: FnMut(&T) -> bool>(&self, predicate: P) -> Option<usize> {
        self.items.iter().position(predicate)
    }

    pub fn retain<P: FnMut(&T) -> bool>(&mut self, predicate: P) {
        self.items.retain(predicate);
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Vector::new();
        for item in iter {
            vector.push(item);
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_get() {
        let mut v = Vector::with_capacity(1);
        v.push(1);
        v.push(2);
        v.push(3);
        assert_eq!(v.len(), 3);
        assert!(v.capacity() >= 3);
        assert_eq!(v.get(1), Some(&2));
        assert_eq!(v.get(5), None);
        assert_eq!(v.pop(), Some(3));
        assert_eq!(v.pop(), Some(2));
        assert_eq!(v.pop(), Some(1));
        assert_eq!(v.pop(), None);
    }

    #[test]
    fn test_growth_doubles() {
        let mut v: Vector<u8> = Vector::new();
        v.push(0);
        assert!(v.capacity() >= MIN_CAPACITY);
        let before = v.capacity();
        for i in 0..before as u8 {
            v.push(i);
        }
        assert!(v.capacity() >= before * 2);
    }

    #[test]
    fn test_move_to_end_is_stable() {
        let mut v: Vector<char> = ['a', 'b', 'c', 'd'].into_iter().collect();
        assert!(v.move_to_end(1));
        assert_eq!(v.as_slice(), &['a', 'c', 'd', 'b']);
        assert!(!v.move_to_end(9));
    }

    #[test]
    fn test_remove_and_position() {
        let mut v: Vector<u32> = (10..15).collect();
        let index = v.position(|&x| x == 12).unwrap();
        assert_eq!(v.remove(index), Some(12));
        assert_eq!(v.as_slice(), &[10, 11, 13, 14]);
        assert_eq!(v.remove(10), None);

        v.retain(|&x| x % 2 == 0);
        assert_eq!(v.as_slice(), &[10, 14]);
    }
}
