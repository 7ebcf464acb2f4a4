use crate::ast::Value;
use crate::error::ArrayError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array {
    children: Vec<Value>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(index: usize, value: &Value) -> Result<(), ArrayError> {
        if value.is_nan() {
            return Err(ArrayError::InvalidElement(index));
        }
        Ok(())
    }

    /// Appends `value`. NaN is rejected; infinities are kept.
    pub fn add(&mut self, value: Value) -> Result<(), ArrayError> {
        Self::check(self.children.len(), &value)?;
        self.children.push(value);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, value: Value) -> Result<(), ArrayError> {
        if index > self.children.len() {
            return Err(self.out_of_bounds(index));
        }
        Self::check(index, &value)?;
        self.children.insert(index, value);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Value, ArrayError> {
        if index >= self.children.len() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.children.remove(index))
    }

    pub fn get(&self, index: usize) -> Result<&Value, ArrayError> {
        self.children
            .get(index)
            .ok_or_else(|| self.out_of_bounds(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Value, ArrayError> {
        let len = self.children.len();
        self.children
            .get_mut(index)
            .ok_or(ArrayError::IndexOutOfBounds { index, len })
    }

    fn out_of_bounds(&self, index: usize) -> ArrayError {
        ArrayError::IndexOutOfBounds {
            index,
            len: self.children.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.children.iter()
    }
}

impl TryFrom<Vec<Value>> for Array {
    type Error = ArrayError;

    fn try_from(values: Vec<Value>) -> Result<Self, Self::Error> {
        for (index, value) in values.iter().enumerate() {
            Self::check(index, value)?;
        }
        Ok(Self { children: values })
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.into_iter()
    }
}
