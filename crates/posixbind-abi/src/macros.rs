//! Helper macros for mapping core enums onto C library constants.

/// Expand to a `match` that maps each variant of a core enum onto the
/// `libc` constant of the same meaning.
///
/// # Usage
///
/// ```ignore
/// libc_constant! { kind, ResourceKind;
///     Core => RLIMIT_CORE,
///     #[cfg(target_os = "linux")]
///     As => RLIMIT_AS,
/// }
/// ```
///
/// Attributes on an arm (typically `#[cfg]`) are forwarded to that arm, so
/// platform-gated variants stay in step with their constants. The match is
/// exhaustive: adding a variant to the core enum without a constant here is
/// a compile error.
macro_rules! libc_constant {
    (
        $value:expr, $ty:ident;
        $( $(#[$meta:meta])* $variant:ident => $constant:ident ),* $(,)?
    ) => {
        match $value {
            $( $(#[$meta])* $ty::$variant => libc::$constant, )*
        }
    };
}

#[allow(unused_imports)]
pub(crate) use libc_constant;
