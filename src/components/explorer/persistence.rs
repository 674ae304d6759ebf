use log::debug;

use super::types::NodeId;

/// What became of a persistence attempt. Skipped writes degrade the
/// share-a-link feature, never the interactive flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersistOutcome {
	Persisted,
	Skipped,
}

/// Selection ids, in order, as the shareable location suffix.
pub fn encode(ids: &[NodeId]) -> String {
	ids.iter()
		.map(|id| id.to_string())
		.collect::<Vec<_>>()
		.join(",")
}

/// Parse a location suffix back into an id sequence. Malformed tokens
/// are dropped; an empty result is the caller's cue to fall back to a
/// random node.
pub fn decode(suffix: &str) -> Vec<NodeId> {
	suffix
		.split(',')
		.filter_map(|token| token.parse::<NodeId>().ok())
		.collect()
}

/// Everything after the last `?` of an href, if any.
pub fn location_suffix(href: &str) -> Option<&str> {
	href.rfind('?').map(|i| &href[i + 1..])
}

/// Where the shareable location lives. The browser implementation is
/// [`BrowserLocation`]; tests keep the location in memory.
pub trait LocationStore {
	fn read_suffix(&self) -> Option<String>;
	fn write_suffix(&mut self, suffix: &str) -> PersistOutcome;
}

/// History/location-backed store. Hosts that forbid history mutation
/// make writes report [`PersistOutcome::Skipped`].
pub struct BrowserLocation;

impl LocationStore for BrowserLocation {
	fn read_suffix(&self) -> Option<String> {
		let href = web_sys::window()?.location().href().ok()?;
		location_suffix(&href).map(str::to_owned)
	}

	fn write_suffix(&mut self, suffix: &str) -> PersistOutcome {
		let url = format!("index.html?{suffix}");
		let written = web_sys::window()
			.and_then(|w| w.history().ok())
			.map(|h| {
				h.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&url))
					.is_ok()
			})
			.unwrap_or(false);
		if written {
			PersistOutcome::Persisted
		} else {
			debug!("history mutation unavailable, selection not persisted");
			PersistOutcome::Skipped
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encode_decode_round_trip_preserves_order() {
		let suffix = encode(&[3, 7, 2]);
		assert_eq!(suffix, "3,7,2");
		assert_eq!(decode(&suffix), vec![3, 7, 2]);
	}

	#[test]
	fn decode_drops_malformed_tokens() {
		assert_eq!(decode("4,x,7"), vec![4, 7]);
		assert_eq!(decode("garbage"), Vec::<NodeId>::new());
		assert_eq!(decode(""), Vec::<NodeId>::new());
	}

	#[test]
	fn decode_keeps_duplicates_for_restore_to_collapse() {
		assert_eq!(decode("5,9,5"), vec![5, 9, 5]);
	}

	#[test]
	fn suffix_is_everything_after_the_last_question_mark() {
		assert_eq!(location_suffix("host/index.html?1,2,3"), Some("1,2,3"));
		assert_eq!(location_suffix("host/a?b/index.html?9"), Some("9"));
		assert_eq!(location_suffix("host/index.html"), None);
	}
}
