//! Size Estimation Module
//!
//! Approximate byte costs for keys and values.
//!
//! Estimates are shallow: containers count `len × element width`, without
//! following heap data owned by the elements. They are meant to be monotonic
//! and comparable so capacity bounds behave predictably, not to match what
//! the allocator actually hands out.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::mem::size_of;
use std::rc::Rc;
use std::sync::Arc;

/// Bookkeeping cost added to every entry: creation instant, size field, TTL
/// and recency node handle.
pub const ENTRY_OVERHEAD: u64 = 48;

// == Estimate Size ==
/// Approximate in-memory cost of a cached key or value.
///
/// Implement this for your own types to give the cache an explicit size
/// hook, or use [`fixed_size!`](crate::fixed_size) to charge the static
/// width of the type.
///
/// ```
/// use ttl_cache::EstimateSize;
///
/// struct Session {
///     user: String,
///     roles: Vec<u32>,
/// }
///
/// impl EstimateSize for Session {
///     fn estimated_size(&self) -> usize {
///         self.user.estimated_size() + self.roles.estimated_size()
///     }
/// }
/// ```
pub trait EstimateSize {
    /// Width shared by every value of the type, when it does not depend on
    /// the value itself.
    const FIXED_WIDTH: Option<usize> = None;

    /// Estimated size of this value in bytes.
    fn estimated_size(&self) -> usize;
}

/// Implements [`EstimateSize`] using `size_of` as a fixed width.
///
/// Suitable for plain-data types; for types owning heap data this is a
/// lower bound, so prefer a manual implementation there.
#[macro_export]
macro_rules! fixed_size {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::EstimateSize for $ty {
                const FIXED_WIDTH: Option<usize> = Some(::std::mem::size_of::<$ty>());

                fn estimated_size(&self) -> usize {
                    ::std::mem::size_of::<$ty>()
                }
            }
        )+
    };
}

fixed_size!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    std::time::Duration,
    std::net::IpAddr,
    std::net::SocketAddr,
);

// == Text ==
impl EstimateSize for str {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl EstimateSize for String {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for &T {
    const FIXED_WIDTH: Option<usize> = T::FIXED_WIDTH;

    fn estimated_size(&self) -> usize {
        (**self).estimated_size()
    }
}

// == Containers ==
impl<T> EstimateSize for [T] {
    fn estimated_size(&self) -> usize {
        self.len() * size_of::<T>()
    }
}

impl<T, const N: usize> EstimateSize for [T; N] {
    const FIXED_WIDTH: Option<usize> = Some(N * size_of::<T>());

    fn estimated_size(&self) -> usize {
        N * size_of::<T>()
    }
}

impl<T> EstimateSize for Vec<T> {
    fn estimated_size(&self) -> usize {
        self.len() * size_of::<T>()
    }
}

impl<T> EstimateSize for VecDeque<T> {
    fn estimated_size(&self) -> usize {
        self.len() * size_of::<T>()
    }
}

impl<T, S> EstimateSize for HashSet<T, S> {
    fn estimated_size(&self) -> usize {
        self.len() * size_of::<T>()
    }
}

impl<T> EstimateSize for BTreeSet<T> {
    fn estimated_size(&self) -> usize {
        self.len() * size_of::<T>()
    }
}

impl<K, V, S> EstimateSize for HashMap<K, V, S> {
    fn estimated_size(&self) -> usize {
        self.len() * (size_of::<K>() + size_of::<V>())
    }
}

impl<K, V> EstimateSize for BTreeMap<K, V> {
    fn estimated_size(&self) -> usize {
        self.len() * (size_of::<K>() + size_of::<V>())
    }
}

// == Wrappers ==
impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimated_size(&self) -> usize {
        match self {
            Some(inner) => inner.estimated_size(),
            None => size_of::<Option<T>>(),
        }
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Box<T> {
    fn estimated_size(&self) -> usize {
        size_of::<usize>() + (**self).estimated_size()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Arc<T> {
    fn estimated_size(&self) -> usize {
        size_of::<usize>() + (**self).estimated_size()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Rc<T> {
    fn estimated_size(&self) -> usize {
        size_of::<usize>() + (**self).estimated_size()
    }
}

impl<A: EstimateSize, B: EstimateSize> EstimateSize for (A, B) {
    fn estimated_size(&self) -> usize {
        self.0.estimated_size() + self.1.estimated_size()
    }
}

// == Size Estimator ==
/// Computes entry costs for one key/value type pair.
///
/// Fixed widths are resolved once at construction so scalar keys and values
/// never go through their `estimated_size` implementation.
#[derive(Debug, Clone, Copy)]
pub struct SizeEstimator<K: ?Sized, V: ?Sized> {
    key_width: Option<usize>,
    value_width: Option<usize>,
    _types: PhantomData<fn(&K, &V)>,
}

impl<K: EstimateSize + ?Sized, V: EstimateSize + ?Sized> SizeEstimator<K, V> {
    pub fn new() -> Self {
        Self {
            key_width: K::FIXED_WIDTH,
            value_width: V::FIXED_WIDTH,
            _types: PhantomData,
        }
    }

    // == Entry Size ==
    /// Estimated cost of storing `value` under `key`, overhead included.
    pub fn entry_size(&self, key: &K, value: &V) -> u64 {
        let key_size = self.key_width.unwrap_or_else(|| key.estimated_size());
        let value_size = self.value_width.unwrap_or_else(|| value.estimated_size());

        key_size as u64 + value_size as u64 + ENTRY_OVERHEAD
    }
}

impl<K: EstimateSize + ?Sized, V: EstimateSize + ?Sized> Default for SizeEstimator<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
