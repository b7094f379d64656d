use serde::Serialize;

use crate::error::Result;

/// Render any report section as pretty-printed JSON.
pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(json)
}
