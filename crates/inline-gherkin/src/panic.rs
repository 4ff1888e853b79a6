//! Helpers for rendering panic payloads.

/// Extracts a panic payload into a human-readable message.
///
/// Common primitive payloads are downcast; anything else is reported as an
/// opaque payload with its [`TypeId`](std::any::TypeId).
///
/// # Examples
///
/// ```
/// use inline_gherkin::panic_message;
///
/// let Err(payload) = std::panic::catch_unwind(|| panic!("boom")) else {
///     unreachable!();
/// };
/// assert_eq!(panic_message(payload.as_ref()), "boom");
/// ```
#[must_use]
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    macro_rules! try_downcast {
        ($($ty:ty),* $(,)?) => {
            $(
                if let Some(value) = payload.downcast_ref::<$ty>() {
                    return value.to_string();
                }
            )*
        };
    }

    try_downcast!(&str, String, i32, u32, i64, u64, isize, usize);
    format!("opaque panic payload (TypeId({:?}))", payload.type_id())
}
