//! Explicit converters carried by conversion graph edges.

use crate::data::{Data, DataValue};
use crate::info::DataTypeInfo;
use anyhow::anyhow;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Converts values of one data type into another.
///
/// Converters run on executor threads, possibly several at once on
/// independent inputs. They must not mutate shared state.
pub trait DataConverter: Send + Sync {
    fn input(&self) -> &DataTypeInfo;

    fn output(&self) -> &DataTypeInfo;

    /// `value` is the input type or a descendant of it.
    fn convert(&self, value: &dyn Data) -> anyhow::Result<DataValue>;
}

type ConvertFn = dyn Fn(&dyn Data) -> anyhow::Result<DataValue> + Send + Sync;

/// A converter backed by a closure.
pub struct FnConverter {
    input: DataTypeInfo,
    output: DataTypeInfo,
    convert: Box<ConvertFn>,
}

impl FnConverter {
    pub fn new<F>(input: DataTypeInfo, output: DataTypeInfo, convert: F) -> Self
    where
        F: Fn(&dyn Data) -> anyhow::Result<DataValue> + Send + Sync + 'static,
    {
        Self {
            input,
            output,
            convert: Box::new(convert),
        }
    }

    /// Wraps a typed function `&A -> B`. The input is read through the
    /// upcast chain, so descendants of `A` are accepted.
    pub fn typed<A, B, F>(input: DataTypeInfo, output: DataTypeInfo, convert: F) -> Self
    where
        A: Any,
        B: Data,
        F: Fn(&A) -> anyhow::Result<B> + Send + Sync + 'static,
    {
        let expected = input.label();
        Self::new(input, output, move |value: &dyn Data| {
            let typed = value.downcast_ref::<A>().ok_or_else(|| {
                anyhow!(
                    "converter expected {} but received {}",
                    expected,
                    value.type_key().name()
                )
            })?;
            Ok(Arc::new(convert(typed)?) as DataValue)
        })
    }

    pub fn into_arc(self) -> Arc<dyn DataConverter> {
        Arc::new(self)
    }
}

impl DataConverter for FnConverter {
    fn input(&self) -> &DataTypeInfo {
        &self.input
    }

    fn output(&self) -> &DataTypeInfo {
        &self.output
    }

    fn convert(&self, value: &dyn Data) -> anyhow::Result<DataValue> {
        (self.convert)(value)
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter")
            .field("input", &self.input.label())
            .field("output", &self.output.label())
            .finish()
    }
}
