// Helpers shared by the binder for dispatching on a field's runtime type.
// The derive macro itself lives in the envbind-macros crate.

/// Downcasts `$field: &mut dyn Any` to the first supported value type and
/// evaluates `$body` with `$target` bound to it.
///
/// Evaluates to `None` when the field has no supported type.
macro_rules! with_value_type {
    (@try $field:ident, $target:ident, $body:expr; $($ty:ty),* $(,)?) => {
        $(
            if let Some($target) = $field.downcast_mut::<$ty>() {
                Some($body)
            } else
        )* {
            None
        }
    };
    ($field:expr, |$target:ident| $body:expr) => {{
        let field: &mut dyn ::std::any::Any = $field;
        with_value_type!(@try field, $target, $body;
            String, bool,
            i8, i16, i32, i64, i128, isize,
            u8, u16, u32, u64, u128, usize,
            f32, f64,
            ::chrono::DateTime<::chrono::Utc>)
    }};
}

pub(crate) use with_value_type;
