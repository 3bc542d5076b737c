//! Metadata encoding for the QnA Maker store.
//!
//! The store downcases every metadata name and value, and only knows flat
//! string pairs. Items keep a few extra control fields (`enabled`, `action`,
//! `redirectFlow`, `redirectNode`) in that metadata, so values are escaped on
//! write and restored on read.
//!
//! The default [`CaseMarkerCodec`] wraps each ASCII uppercase letter `U` as
//! `sssoooUsss`. After the store downcases it to `sssooousss`, decoding
//! splits on `sss` and upper-cases every chunk that starts with `ooo`. The
//! scheme is the live wire format and is not collision-proof: values that
//! already contain `sss` or `ooo`, contain an uppercase `S`, or have an `s`
//! right before an uppercase letter do not survive a round trip.

use crate::models::{MetadataPair, QnaItem};

const MARKER: &str = "sss";
const UPPER_PREFIX: &str = "ooo";

/// Fields written to metadata, in write order.
const ENABLED: &str = "enabled";
const ACTION: &str = "action";
const REDIRECT_FLOW: &str = "redirectFlow";
const REDIRECT_NODE: &str = "redirectNode";

/// Value-level transform between caller strings and stored metadata strings.
///
/// Field selection and name mapping are shared; implementors only decide how
/// a single string value is escaped and restored.
pub trait MetadataCodec: Send + Sync {
    fn encode_value(&self, value: &str) -> String;

    fn decode_value(&self, value: &str) -> String;

    /// Build the metadata pairs stored for `item`.
    ///
    /// Absent and empty values are dropped. `enabled` is written as
    /// `"true"`/`"false"` without escaping.
    fn prepare_meta(&self, item: &QnaItem) -> Vec<MetadataPair> {
        let escaped = |value: &Option<String>| value.as_deref().map(|v| self.encode_value(v));

        [
            (ENABLED, Some(item.enabled.to_string())),
            (ACTION, escaped(&item.action)),
            (REDIRECT_FLOW, escaped(&item.redirect_flow)),
            (REDIRECT_NODE, escaped(&item.redirect_node)),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| MetadataPair::new(name, v))
        })
        .collect()
    }

    /// Rebuild a caller item from stored parts.
    fn item_data(
        &self,
        questions: Vec<String>,
        answer: String,
        metadata: &[MetadataPair],
    ) -> QnaItem {
        let mut item = QnaItem {
            questions,
            answer,
            ..QnaItem::default()
        };

        for pair in metadata {
            let value = self.decode_value(&pair.value);
            match restore_name(&pair.name) {
                ENABLED => {}
                ACTION => item.action = Some(value),
                REDIRECT_FLOW => item.redirect_flow = Some(value),
                REDIRECT_NODE => item.redirect_node = Some(value),
                other => {
                    item.extra.insert(other.to_string(), value);
                }
            }
        }

        item.enabled = metadata
            .iter()
            .find(|pair| pair.name == ENABLED)
            .is_some_and(|pair| pair.value == "true");

        item
    }
}

/// Undo the store's downcasing of the camel-cased field names.
fn restore_name(name: &str) -> &str {
    match name {
        "redirectflow" => REDIRECT_FLOW,
        "redirectnode" => REDIRECT_NODE,
        other => other,
    }
}

/// The `sssoooUsss` case-marker scheme used by existing knowledge bases.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseMarkerCodec;

impl MetadataCodec for CaseMarkerCodec {
    fn encode_value(&self, value: &str) -> String {
        let mut encoded = String::with_capacity(value.len());
        for c in value.chars() {
            if c.is_ascii_uppercase() {
                encoded.push_str(MARKER);
                encoded.push_str(UPPER_PREFIX);
                encoded.push(c);
                encoded.push_str(MARKER);
            } else {
                encoded.push(c);
            }
        }
        encoded
    }

    fn decode_value(&self, value: &str) -> String {
        value
            .split(MARKER)
            .map(|chunk| match chunk.strip_prefix(UPPER_PREFIX) {
                Some(rest) => rest.to_uppercase(),
                None => chunk.to_string(),
            })
            .collect()
    }
}
