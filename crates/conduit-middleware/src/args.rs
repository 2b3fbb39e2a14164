//! Invocation arguments and positional overrides.
//!
//! A pipeline is called with a fixed-arity tuple. A continuation can replace
//! any position of that tuple by passing the matching `Overrides` tuple, where
//! every position is an `Option`: `Some(value)` substitutes, `None` keeps the
//! original.
//!
//! Merging is always done against the arguments the pipeline was originally
//! called with, and it is shallow: a replaced position is replaced whole.
//!
//! # Known Limitation
//!
//! `None` is the "keep original" sentinel, so an override cannot make a
//! position absent. For a position whose own type is `Option<T>`, passing
//! `Some(None)` does set it to `None`.
//!
//! # Example
//!
//! ```
//! use conduit_middleware::Args;
//!
//! let original = ("world".to_string(), 1_u32);
//! let merged = original.merge((Some(", world".to_string()), None));
//! assert_eq!(merged, (", world".to_string(), 1));
//! ```

/// A fixed-arity argument tuple that can be merged with positional overrides.
///
/// Implemented for `()` and tuples of up to eight elements.
pub trait Args: Clone + Send + Sync + 'static {
    /// The same tuple shape with every position wrapped in `Option`.
    type Overrides: Default + Send + 'static;

    /// Number of positions in the tuple.
    const ARITY: usize;

    /// Builds a new tuple taking each overridden position from `overrides`
    /// and every other position from `self`.
    fn merge(&self, overrides: Self::Overrides) -> Self;
}

impl Args for () {
    type Overrides = ();

    const ARITY: usize = 0;

    fn merge(&self, (): ()) -> Self {}
}

macro_rules! impl_args {
    ($arity:literal => $($idx:tt $ty:ident),+) => {
        impl<$($ty),+> Args for ($($ty,)+)
        where
            $($ty: Clone + Send + Sync + 'static),+
        {
            type Overrides = ($(Option<$ty>,)+);

            const ARITY: usize = $arity;

            fn merge(&self, overrides: Self::Overrides) -> Self {
                ($(overrides.$idx.unwrap_or_else(|| self.$idx.clone()),)+)
            }
        }
    };
}

impl_args!(1 => 0 T0);
impl_args!(2 => 0 T0, 1 T1);
impl_args!(3 => 0 T0, 1 T1, 2 T2);
impl_args!(4 => 0 T0, 1 T1, 2 T2, 3 T3);
impl_args!(5 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4);
impl_args!(6 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5);
impl_args!(7 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6);
impl_args!(8 => 0 T0, 1 T1, 2 T2, 3 T3, 4 T4, 5 T5, 6 T6, 7 T7);
