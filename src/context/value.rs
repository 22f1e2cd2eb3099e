//! Typed payloads stored in the context.

use std::any::Any;
use std::sync::Arc;

/// A value stored under a context key.
///
/// Values are arbitrary `Send + Sync` payloads; clones share the payload.
#[derive(Clone)]
pub struct ContextValue(Arc<dyn Any + Send + Sync>);

impl ContextValue {
    /// Wrap a payload.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Whether the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Render the payload as text when it is a common scalar type.
    pub fn to_text(&self) -> Option<String> {
        macro_rules! render {
            ($($ty:ty),*) => {
                $(
                    if let Some(v) = self.downcast_ref::<$ty>() {
                        return Some(v.to_string());
                    }
                )*
            };
        }

        if let Some(v) = self.downcast_ref::<serde_json::Value>() {
            return Some(match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }
        render!(String, &'static str, i32, i64, u32, u64, usize, f32, f64, bool, char);
        None
    }
}

impl std::fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "ContextValue({:?})", text),
            None => write!(f, "ContextValue(<opaque>)"),
        }
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcasts_to_stored_type() {
        let value = ContextValue::new(42_i64);
        assert_eq!(value.downcast_ref::<i64>(), Some(&42));
        assert!(value.downcast_ref::<i32>().is_none());
        assert!(value.is::<i64>());
    }

    #[test]
    fn renders_scalars() {
        assert_eq!(ContextValue::from("abc").to_text().as_deref(), Some("abc"));
        assert_eq!(ContextValue::new(7_u32).to_text().as_deref(), Some("7"));
        assert_eq!(ContextValue::new(true).to_text().as_deref(), Some("true"));
    }

    #[test]
    fn renders_json_strings_unquoted() {
        let value = ContextValue::from(serde_json::json!("plain"));
        assert_eq!(value.to_text().as_deref(), Some("plain"));
        let value = ContextValue::from(serde_json::json!({"a": 1}));
        assert_eq!(value.to_text().as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn opaque_values_do_not_render() {
        struct Handle;
        let value = ContextValue::new(Handle);
        assert!(value.to_text().is_none());
        assert_eq!(format!("{:?}", value), "ContextValue(<opaque>)");
    }

    #[test]
    fn clones_share_payload() {
        let value = ContextValue::new(vec![1, 2, 3]);
        let clone = value.clone();
        assert!(std::ptr::eq(
            value.downcast_ref::<Vec<i32>>().unwrap(),
            clone.downcast_ref::<Vec<i32>>().unwrap()
        ));
    }
}
