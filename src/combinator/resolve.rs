//! Recursive unwrap capability for values that may contain futures.

use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::future::Future;
use crate::pool::PoolHandle;

/// Classification of a future over `T`, decided at compile time by which
/// `Resolve` implementation `T` picked up.
pub enum Nesting<T: Resolve> {
    /// The future already holds its final value type; the handle can pass
    /// through unchanged.
    Flat(Future<T::Output>),
    /// At least one more future layer remains to unwrap.
    Nested(Future<T>),
}

/// A value that can be brought to its final form by blocking on zero or
/// more layers of futures.
///
/// Plain values resolve to themselves. A [`Future`] resolves by
/// retrieving its result and resolving that, one layer per step,
/// bottoming out at the first non-future value. Tuples resolve slot by
/// slot in order, so heterogeneous mixes of plain values and (nested)
/// futures unwrap in one operation. The first error stops the recursion
/// and propagates verbatim; anything not yet unwrapped is dropped.
///
/// Implement this for your own types to let them ride along as plain
/// tuple slots; the implementation is the identity one the standard
/// leaf types use.
pub trait Resolve: Send + Sized + 'static {
    /// The innermost value type.
    type Output: Send + 'static;

    /// Blocks until every nested layer is unwrapped.
    fn resolve(self) -> Result<Self::Output>;

    /// How a future over `Self` is classified; `flatten` returns
    /// [`Nesting::Flat`] handles unchanged instead of spawning a task.
    fn nesting(future: Future<Self>) -> Nesting<Self>;

    /// The pool associated with this value, if any; combinators use it
    /// to pick an executor.
    fn pool_hint(&self) -> Option<PoolHandle> {
        None
    }
}

impl<T: Resolve> Resolve for Future<T> {
    type Output = T::Output;

    fn resolve(self) -> Result<Self::Output> {
        self.get()?.resolve()
    }

    fn nesting(future: Future<Self>) -> Nesting<Self> {
        Nesting::Nested(future)
    }

    fn pool_hint(&self) -> Option<PoolHandle> {
        self.pool()
    }
}

macro_rules! impl_resolve_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Resolve for $ty {
                type Output = $ty;

                fn resolve(self) -> Result<Self::Output> {
                    Ok(self)
                }

                fn nesting(future: Future<Self>) -> Nesting<Self> {
                    Nesting::Flat(future)
                }
            }
        )*
    };
}

impl_resolve_leaf!(
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
    String,
    &'static str,
);

impl<T: Send + 'static> Resolve for Vec<T> {
    type Output = Vec<T>;

    fn resolve(self) -> Result<Self::Output> {
        Ok(self)
    }

    fn nesting(future: Future<Self>) -> Nesting<Self> {
        Nesting::Flat(future)
    }
}

impl<T: Send + 'static> Resolve for Option<T> {
    type Output = Option<T>;

    fn resolve(self) -> Result<Self::Output> {
        Ok(self)
    }

    fn nesting(future: Future<Self>) -> Nesting<Self> {
        Nesting::Flat(future)
    }
}

impl<K, V, S> Resolve for HashMap<K, V, S>
where
    K: Send + 'static,
    V: Send + 'static,
    S: Send + 'static,
{
    type Output = HashMap<K, V, S>;

    fn resolve(self) -> Result<Self::Output> {
        Ok(self)
    }

    fn nesting(future: Future<Self>) -> Nesting<Self> {
        Nesting::Flat(future)
    }
}

impl<K: Send + 'static, V: Send + 'static> Resolve for BTreeMap<K, V> {
    type Output = BTreeMap<K, V>;

    fn resolve(self) -> Result<Self::Output> {
        Ok(self)
    }

    fn nesting(future: Future<Self>) -> Nesting<Self> {
        Nesting::Flat(future)
    }
}

macro_rules! impl_resolve_tuple {
    ($($slot:ident),+) => {
        impl<$($slot: Resolve),+> Resolve for ($($slot,)+) {
            type Output = ($($slot::Output,)+);

            #[allow(non_snake_case)]
            fn resolve(self) -> Result<Self::Output> {
                let ($($slot,)+) = self;
                Ok(($($slot.resolve()?,)+))
            }

            fn nesting(future: Future<Self>) -> Nesting<Self> {
                Nesting::Nested(future)
            }

            #[allow(non_snake_case)]
            fn pool_hint(&self) -> Option<PoolHandle> {
                let ($($slot,)+) = self;
                $(
                    if let Some(pool) = $slot.pool_hint() {
                        return Some(pool);
                    }
                )+
                None
            }
        }
    };
}

impl_resolve_tuple!(A);
impl_resolve_tuple!(A, B);
impl_resolve_tuple!(A, B, C);
impl_resolve_tuple!(A, B, C, D);
impl_resolve_tuple!(A, B, C, D, E);
impl_resolve_tuple!(A, B, C, D, E, F);
impl_resolve_tuple!(A, B, C, D, E, F, G);
impl_resolve_tuple!(A, B, C, D, E, F, G, H);
