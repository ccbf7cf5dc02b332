use std::marker::PhantomData;

use super::{GetStr, InternStr};

/// Internals used by all of our interners.
/// Strings are packed end-to-end in one buffer; each key stores its start offset.
#[derive(Debug)]
pub struct KeyToStr<Key = u32> {
    key_to_str: Vec<usize>,
    strings: String,
    _phantom: PhantomData<Key>,
}

impl<Key> KeyToStr<Key> {
    pub fn with_capacity_and_avg_len(cap: usize, avg_len: usize) -> Self {
        Self {
            key_to_str: Vec::with_capacity(cap),
            strings: String::with_capacity(cap * avg_len),
            _phantom: PhantomData,
        }
    }

    fn get_start_and_end(&self, k: usize) -> (usize, usize) {
        let start = self.key_to_str[k];
        let end = if k == self.key_to_str.len() - 1 {
            self.strings.len()
        } else {
            self.key_to_str[k + 1]
        };
        (start, end)
    }
}

// GetStr ////////////////////
impl<Key: Into<usize>> GetStr<Key> for KeyToStr<Key> {
    fn get(&self, k: Key) -> &str {
        let (start, end) = self.get_start_and_end(k.into());
        &self.strings[start..end]
    }

    fn len(&self) -> usize {
        self.key_to_str.len()
    }

    fn str_len(&self) -> usize {
        self.strings.len()
    }
}

// InternStr ///////////////////
impl<Key: From<usize>> InternStr<Key> for KeyToStr<Key> {
    fn intern<T: AsRef<str>>(&mut self, s: T) -> Key {
        let k = Key::from(self.key_to_str.len());
        self.key_to_str.push(self.strings.len());
        self.strings.push_str(s.as_ref());
        k
    }
}
