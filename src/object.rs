use crate::ast::Value;
use crate::error::ObjectError;
use crate::string::JsonString;
use std::collections::BTreeMap;

/// Key to value mapping with unique keys.
///
/// `keys` remembers insertion order for enumeration; the map itself is
/// ordered byte-wise, which is the order the formatter writes members in.
/// Every key in `keys` has exactly one entry in `children` and vice versa.
#[derive(Debug, Clone, Default)]
pub struct Object {
    children: BTreeMap<JsonString, Value>,
    keys: Vec<JsonString>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member. An existing key keeps its place in the key order and has
    /// its value replaced; the previous value is returned.
    ///
    /// NaN is rejected, as it is by [`Array`](crate::Array); infinities are kept.
    pub fn add(
        &mut self,
        key: impl Into<JsonString>,
        value: Value,
    ) -> Result<Option<Value>, ObjectError> {
        let key = key.into();
        if value.is_nan() {
            return Err(ObjectError::InvalidValue(key.to_string()));
        }
        if let Some(slot) = self.children.get_mut(&key) {
            return Ok(Some(std::mem::replace(slot, value)));
        }
        self.keys.push(key.clone());
        self.children.insert(key, value);
        Ok(None)
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<&Value, ObjectError> {
        let key = JsonString::new(key);
        self.children
            .get(&key)
            .ok_or_else(|| ObjectError::InvalidKey(key.to_string()))
    }

    pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Result<&mut Value, ObjectError> {
        let key = JsonString::new(key);
        match self.children.get_mut(&key) {
            Some(value) => Ok(value),
            None => Err(ObjectError::InvalidKey(key.to_string())),
        }
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.children.contains_key(&JsonString::new(key))
    }

    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Result<Value, ObjectError> {
        let key = JsonString::new(key);
        let value = self
            .children
            .remove(&key)
            .ok_or_else(|| ObjectError::InvalidKey(key.to_string()))?;
        self.keys.retain(|k| *k != key);
        Ok(value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> &[JsonString] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&JsonString, &Value)> {
        self.keys
            .iter()
            .filter_map(move |k| self.children.get_key_value(k))
    }

    /// Members in byte-wise key order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&JsonString, &Value)> {
        self.children.iter()
    }
}

// Member order is not part of an object's identity.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl<K: Into<JsonString>> TryFrom<Vec<(K, Value)>> for Object {
    type Error = ObjectError;

    fn try_from(members: Vec<(K, Value)>) -> Result<Self, Self::Error> {
        let mut object = Object::new();
        for (key, value) in members {
            object.add(key, value)?;
        }
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(members: Vec<(&str, Value)>) -> Object {
        Object::try_from(members).unwrap()
    }

    fn key_list(o: &Object) -> Vec<String> {
        o.keys().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_add_and_get() {
        let mut o = Object::new();
        assert!(o.is_empty());
        assert_eq!(o.add("test", Value::Null), Ok(None));
        assert_eq!(o.add("array", Value::Int(1)), Ok(None));
        assert_eq!(o.len(), 2);
        assert_eq!(o.get("test"), Ok(&Value::Null));
        assert_eq!(o.get("array").unwrap().as_int(), Ok(1));
        assert!(o.contains_key("array"));
        assert!(!o.contains_key("missing"));
    }

    #[test]
    fn test_missing_key() {
        let mut o = Object::new();
        o.add("a", Value::Null).unwrap();
        assert_eq!(
            o.get("b"),
            Err(ObjectError::InvalidKey("b".to_string()))
        );
        assert!(o.get_mut("b").is_err());
        assert_eq!(
            o.remove("b"),
            Err(ObjectError::InvalidKey("b".to_string()))
        );
    }

    #[test]
    fn test_key_order() {
        let o = object(vec![
            ("b", Value::Null),
            ("c", Value::Null),
            ("a", Value::Null),
        ]);
        assert_eq!(key_list(&o), vec!["b", "c", "a"]);
        let sorted: Vec<String> = o.iter_sorted().map(|(k, _)| k.to_string()).collect();
        assert_eq!(sorted, vec!["a", "b", "c"]);
        let inserted: Vec<String> = o.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(inserted, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_duplicate_key_replaces_value() {
        let mut o = Object::new();
        o.add("a", Value::Int(1)).unwrap();
        o.add("b", Value::Int(2)).unwrap();
        assert_eq!(o.add("a", Value::Int(3)), Ok(Some(Value::Int(1))));
        assert_eq!(o.len(), 2);
        assert_eq!(key_list(&o), vec!["a", "b"]);
        assert_eq!(o.get("a"), Ok(&Value::Int(3)));
    }

    #[test]
    fn test_remove_keeps_keys_in_sync() {
        let mut o = Object::new();
        o.add("a", Value::Int(1)).unwrap();
        o.add("b", Value::Int(2)).unwrap();
        assert_eq!(o.remove("a"), Ok(Value::Int(1)));
        assert_eq!(key_list(&o), vec!["b"]);
        assert_eq!(o.iter_sorted().count(), 1);
        o.add("a", Value::Int(4)).unwrap();
        assert_eq!(key_list(&o), vec!["b", "a"]);
    }

    #[test]
    fn test_get_mut() {
        let mut o = Object::new();
        o.add("flag", Value::Bool(false)).unwrap();
        o.get_mut("flag").unwrap().set_bool(true).unwrap();
        assert_eq!(o.get("flag").unwrap().as_bool(), Ok(true));
    }

    #[test]
    fn test_nul_in_key() {
        let mut o = Object::new();
        o.add("a\0b", Value::Null).unwrap();
        assert!(o.contains_key("a\0b"));
        assert!(!o.contains_key("a"));
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let x = object(vec![("a", Value::Int(1)), ("b", Value::Int(2))]);
        let y = object(vec![("b", Value::Int(2)), ("a", Value::Int(1))]);
        assert_eq!(x, y);
    }

    #[test]
    fn test_rejects_nan() {
        let mut o = object(vec![("a", Value::Int(1))]);
        assert_eq!(
            o.add("a", Value::Float(f64::NAN)),
            Err(ObjectError::InvalidValue("a".to_string()))
        );
        assert_eq!(o.get("a"), Ok(&Value::Int(1)));
        assert!(Object::try_from(vec![("b", Value::Float(f64::NAN))]).is_err());
    }

    #[test]
    fn test_keeps_infinities() {
        let mut o = Object::new();
        o.add("up", Value::Float(f64::INFINITY)).unwrap();
        o.add("down", Value::Float(f64::NEG_INFINITY)).unwrap();
        assert_eq!(o.get("up").unwrap().as_float(), Ok(f64::INFINITY));
        assert_eq!(o.len(), 2);
    }
}
