use hashbrown::hash_map::{HashMap, RawEntryMut};
use std::hash::BuildHasher;

use super::{GetStr, InternStr};

/// Internals used for keeping track of interned string ids.
/// Uses a HashMap with no value (w/ `()` as the value parameter) internally.
/// This acts as a mapping from string hash -> Key, w/o double-storing the
/// actual contents of the string.
#[derive(Debug)]
pub struct StrToKey<Key = u32, H = crate::Hasher> {
    map: HashMap<Key, (), ()>,
    hasher: H,
}

impl<Key, H: Default> StrToKey<Key, H> {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(cap, ()),
            hasher: H::default(),
        }
    }
}

impl<Key: Copy, H: BuildHasher> StrToKey<Key, H> {
    /// Return the key for `s`, interning it into `key_to_str` first if necessary.
    pub fn intern<T>(&mut self, s: &str, key_to_str: &mut T) -> Key
    where
        T: GetStr<Key> + InternStr<Key>,
    {
        let hash = self.hasher.hash_one(s);
        // the value of the entry for this hash is the key we can use to look up a string in `key_to_str`.
        let entry = self
            .map
            .raw_entry_mut()
            .from_hash(hash, |colliding_key| key_to_str.get(*colliding_key) == s);

        match entry {
            RawEntryMut::Occupied(entry) => *entry.into_key(),
            RawEntryMut::Vacant(entry) => {
                let new_k = key_to_str.intern(s);
                let hasher = &self.hasher;
                entry.insert_with_hasher(hash, new_k, (), |colliding_key| {
                    hasher.hash_one(key_to_str.get(*colliding_key))
                });
                new_k
            }
        }
    }

    /// Return the key for `s` if it has already been interned.
    pub fn find<T: GetStr<Key>>(&self, s: &str, key_to_str: &T) -> Option<Key> {
        let hash = self.hasher.hash_one(s);
        self.map
            .raw_entry()
            .from_hash(hash, |colliding_key| key_to_str.get(*colliding_key) == s)
            .map(|(k, _)| *k)
    }
}
