use std::marker::PhantomData;

use super::{FindStr, GetStr, InternStr};

/// Interner wrapper whose keys are a typed id (`OuterKey`)
/// instead of the inner interner's raw key.
#[derive(Debug)]
pub struct TypedInterner<OuterKey, T, InnerKey = usize> {
    interner: T,
    _phantom_outer: PhantomData<OuterKey>,
    _phantom_inner: PhantomData<InnerKey>,
}

impl<K, T, L> TypedInterner<K, T, L> {
    pub fn new(interner: T) -> Self {
        Self {
            interner,
            _phantom_outer: PhantomData,
            _phantom_inner: PhantomData,
        }
    }
}

impl<K, T: Default, L> Default for TypedInterner<K, T, L> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// GetStr ///////////////////
impl<OuterKey, T, InnerKey> GetStr<OuterKey> for TypedInterner<OuterKey, T, InnerKey>
where
    OuterKey: Into<InnerKey>,
    T: GetStr<InnerKey>,
{
    fn get(&self, k: OuterKey) -> &str {
        self.interner.get(k.into())
    }

    fn len(&self) -> usize {
        self.interner.len()
    }

    fn str_len(&self) -> usize {
        self.interner.str_len()
    }
}

// InternStr ///////////////
impl<OuterKey, T, InnerKey> InternStr<OuterKey> for TypedInterner<OuterKey, T, InnerKey>
where
    InnerKey: Into<OuterKey>,
    T: InternStr<InnerKey>,
{
    fn intern<U: AsRef<str>>(&mut self, s: U) -> OuterKey {
        self.interner.intern(s).into()
    }
}

// FindStr ///////////////
impl<OuterKey, T, InnerKey> FindStr<OuterKey> for TypedInterner<OuterKey, T, InnerKey>
where
    InnerKey: Into<OuterKey>,
    T: FindStr<InnerKey>,
{
    fn find(&self, s: &str) -> Option<OuterKey> {
        self.interner.find(s).map(Into::into)
    }
}
