mod buffer;
mod cursor;
mod materializer;
mod schema;
mod value;

pub use buffer::BatchBuffer;
pub use cursor::{MemoryCursor, ResultCursor};
pub use materializer::{fill_batch, pack_inputs, pack_row};
pub use schema::{Column, Schema};
pub use value::{DataType, Row, Value};
