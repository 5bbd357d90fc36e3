//! Naming the kind of a recorded failure

use switchgear_state::FailureRecord;

/// Names the kind of error recorded in a [`FailureRecord`]
///
/// Implemented for [`TypeNameKind`] (the default) and for any
/// `Fn(&E) -> String`, so a breaker whose operation returns a type-erased
/// error can report what actually went wrong.
pub trait ErrorKind<E: ?Sized> {
    /// Kind name for `err`
    fn error_kind(&self, err: &E) -> String;
}

/// Names failures after the static type of the error
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeNameKind;

impl<E: ?Sized> ErrorKind<E> for TypeNameKind {
    fn error_kind(&self, _err: &E) -> String {
        FailureRecord::kind_of::<E>()
    }
}

impl<E: ?Sized, G> ErrorKind<E> for G
where
    G: Fn(&E) -> String,
{
    fn error_kind(&self, err: &E) -> String {
        self(err)
    }
}
