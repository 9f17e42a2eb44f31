//! JSON-with-comments decoding for the legacy source documents.

use std::io::Read;

use json_comments::StripComments;
use serde::de::DeserializeOwned;
use serde::de::Error as _;

use crate::error::MigrateError;

pub(crate) fn from_jsonc<T: DeserializeOwned>(content: &[u8]) -> Result<T, MigrateError> {
    // Strip into a buffer first: raw-value captures need slice input.
    let mut stripped = Vec::with_capacity(content.len());
    StripComments::new(content)
        .read_to_end(&mut stripped)
        .map_err(serde_json::Error::custom)?;
    Ok(serde_json::from_slice(&stripped)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_stripped_before_decoding() {
        let content = br#"{
            // line comment
            "value": 1 /* block comment */
        }"#;
        let decoded: serde_json::Value = from_jsonc(content).expect("decode");
        assert_eq!(decoded["value"], 1);
    }
}
