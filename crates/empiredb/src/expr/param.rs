//! Command parameters: values bound once and changeable between builds.

use crate::builder::SqlBuilder;
use crate::error::DbResult;
use crate::types::{DataType, Value};
use std::sync::{Arc, Mutex, MutexGuard};

/// A parameter owned by a command.
///
/// Clones share the same slot, so a value set through any handle is picked
/// up by the next build of the command.
#[derive(Debug, Clone)]
pub struct CmdParam {
    slot: Arc<Mutex<Value>>,
    data_type: DataType,
}

impl CmdParam {
    pub fn new(value: impl Into<Value>, data_type: DataType) -> Self {
        Self {
            slot: Arc::new(Mutex::new(value.into())),
            data_type,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Value> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set(&self, value: impl Into<Value>) {
        *self.lock() = value.into();
    }

    pub fn value(&self) -> Value {
        self.lock().clone()
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Whether both handles refer to the same parameter.
    pub fn same_param(&self, other: &CmdParam) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    pub(crate) fn append_sql(&self, b: &mut SqlBuilder, inline: bool) -> DbResult<()> {
        let value = self.value();
        b.push_value(&value, self.data_type, inline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_value() {
        let p = CmdParam::new(10, DataType::Integer);
        let q = p.clone();
        q.set(11);
        assert_eq!(p.value(), Value::Int(11));
        assert!(p.same_param(&q));
        assert!(!p.same_param(&CmdParam::new(11, DataType::Integer)));
    }
}
