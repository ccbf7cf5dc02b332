use std::hash::BuildHasher;

use super::{FindStr, GetStr, InternStr, KeyToStr, StrToKey};

/// Interner that checks for duplicates and will only intern a given string once.
/// Using the lasso/rodeo hack for packed maps.
/// `Key` is the id and must be big enough to fit total items.
#[derive(Debug)]
pub struct PackedInterner<Key = u32, H = crate::Hasher> {
    str_to_key: StrToKey<Key, H>,
    key_to_str: KeyToStr<Key>,
}

impl<Key> PackedInterner<Key, crate::Hasher> {
    pub fn with_capacity_and_avg_len(cap: usize, avg_len: usize) -> Self {
        Self {
            str_to_key: StrToKey::with_capacity(cap),
            key_to_str: KeyToStr::with_capacity_and_avg_len(cap, avg_len),
        }
    }
}

impl<Key> Default for PackedInterner<Key, crate::Hasher> {
    fn default() -> Self {
        Self::with_capacity_and_avg_len(16, 12)
    }
}

// GetStr /////////////////////
impl<Key: Into<usize>, H> GetStr<Key> for PackedInterner<Key, H> {
    fn get(&self, k: Key) -> &str {
        self.key_to_str.get(k)
    }

    fn len(&self) -> usize {
        self.key_to_str.len()
    }

    fn str_len(&self) -> usize {
        self.key_to_str.str_len()
    }
}

// InternStr ///////////////////
impl<Key, H: BuildHasher> InternStr<Key> for PackedInterner<Key, H>
where
    Key: Copy + Into<usize> + From<usize>,
{
    fn intern<T: AsRef<str>>(&mut self, s: T) -> Key {
        self.str_to_key.intern(s.as_ref(), &mut self.key_to_str)
    }
}

// FindStr ///////////////////
impl<Key, H: BuildHasher> FindStr<Key> for PackedInterner<Key, H>
where
    Key: Copy + Into<usize>,
{
    fn find(&self, s: &str) -> Option<Key> {
        self.str_to_key.find(s, &self.key_to_str)
    }
}
