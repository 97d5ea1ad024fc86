//! Hook System - Named, ordered taps on pipeline stages
//!
//! Hooks let callers observe or alter a pipeline stage without the stage
//! knowing who is listening. Three flavours are provided:
//! - [`WaterfallHook`]: each tap receives the previous tap's output
//! - [`BailHook`]: predicates; the first `true` stops evaluation
//! - [`SyncHook`]: taps receive a mutable reference in turn
//!
//! Taps always run in registration order. Hooks are plain values owned by
//! whatever runs the stage; there is no global registry.

use std::fmt;

type Transform<T> = Box<dyn Fn(T) -> T + Send + Sync>;
type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Visitor<T> = Box<dyn Fn(&mut T) + Send + Sync>;

/// A named tap
struct Tap<F> {
    name: String,
    f: F,
}

fn tap_names<F>(taps: &[Tap<F>]) -> Vec<&str> {
    taps.iter().map(|t| t.name.as_str()).collect()
}

/// Hook whose taps transform a value in sequence
pub struct WaterfallHook<T> {
    taps: Vec<Tap<Transform<T>>>,
}

impl<T> WaterfallHook<T> {
    /// Create a hook with no taps
    pub fn new() -> Self {
        Self { taps: Vec::new() }
    }

    /// Register a tap
    pub fn tap<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.taps.push(Tap {
            name: name.into(),
            f: Box::new(f),
        });
    }

    /// Run every tap over the value
    pub fn call(&self, value: T) -> T {
        self.taps.iter().fold(value, |acc, tap| (tap.f)(acc))
    }

    /// Names of registered taps, in order
    pub fn names(&self) -> Vec<&str> {
        tap_names(&self.taps)
    }

    /// Check if no taps are registered
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

/// Hook whose taps are predicates; evaluation stops at the first `true`
pub struct BailHook<T> {
    taps: Vec<Tap<Predicate<T>>>,
}

impl<T> BailHook<T> {
    /// Create a hook with no taps
    pub fn new() -> Self {
        Self { taps: Vec::new() }
    }

    /// Register a tap
    pub fn tap<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.taps.push(Tap {
            name: name.into(),
            f: Box::new(f),
        });
    }

    /// Name of the first tap returning `true`, if any
    pub fn call(&self, value: &T) -> Option<&str> {
        self.taps
            .iter()
            .find(|tap| (tap.f)(value))
            .map(|tap| tap.name.as_str())
    }

    /// Whether any tap returns `true`
    pub fn any(&self, value: &T) -> bool {
        self.call(value).is_some()
    }

    /// Names of registered taps, in order
    pub fn names(&self) -> Vec<&str> {
        tap_names(&self.taps)
    }

    /// Check if no taps are registered
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

/// Hook whose taps each receive the value mutably
pub struct SyncHook<T> {
    taps: Vec<Tap<Visitor<T>>>,
}

impl<T> SyncHook<T> {
    /// Create a hook with no taps
    pub fn new() -> Self {
        Self { taps: Vec::new() }
    }

    /// Register a tap
    pub fn tap<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.taps.push(Tap {
            name: name.into(),
            f: Box::new(f),
        });
    }

    /// Run every tap against the value
    pub fn call(&self, value: &mut T) {
        for tap in &self.taps {
            (tap.f)(value);
        }
    }

    /// Names of registered taps, in order
    pub fn names(&self) -> Vec<&str> {
        tap_names(&self.taps)
    }

    /// Check if no taps are registered
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

macro_rules! impl_hook_common {
    ($($hook:ident),*) => {
        $(
            impl<T> Default for $hook<T> {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl<T> fmt::Debug for $hook<T> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($hook))
                        .field("taps", &self.names())
                        .finish()
                }
            }
        )*
    };
}

impl_hook_common!(WaterfallHook, BailHook, SyncHook);
