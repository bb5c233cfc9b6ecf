//! Request bodies and response parsing for the InnerTube API.
//!
//! Responses are deeply nested renderer trees. Everything here works on
//! [`serde_json::Value`] and never touches the network.

use serde_json::{Value, json};

use crate::types::{DestinationPlaylist, MediaKind, SearchMatch};

/// Browse id of the "Playlists" page of the user's library.
pub const LIBRARY_PLAYLISTS_BROWSE_ID: &str = "FEmusic_liked_playlists";

/// Client context sent with every request. `date` is `YYYYMMDD`.
pub fn context(date: &str, language: &str) -> Value {
    json!({
        "client": {
            "clientName": "WEB_REMIX",
            "clientVersion": format!("1.{}.01.00", date),
            "hl": language,
        },
        "user": {},
    })
}

/// Search filter parameters restricting results to one media kind.
pub fn search_params(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Song => "EgWKAQIIAWoMEA4QChADEAQQCRAF",
    }
}

pub fn search_body(query: &str, kind: MediaKind) -> Value {
    json!({ "query": query, "params": search_params(kind) })
}

pub fn create_playlist_body(name: &str, description: &str) -> Value {
    json!({
        "title": name,
        "description": description,
        "privacyStatus": "PRIVATE",
    })
}

pub fn add_items_body(playlist_id: &str, item_ids: &[String]) -> Value {
    let actions: Vec<Value> = item_ids
        .iter()
        .map(|id| {
            json!({
                "action": "ACTION_ADD_VIDEO",
                "addedVideoId": id,
                "dedupeOption": "DEDUPE_OPTION_SKIP",
            })
        })
        .collect();

    json!({ "playlistId": playlist_id, "actions": actions })
}

/// Search results in ranking order. Items without a video id are skipped.
pub fn search_results(response: &Value) -> Vec<SearchMatch> {
    let mut shelves = Vec::new();
    find_all(response, "musicShelfRenderer", &mut shelves);

    shelves
        .into_iter()
        .filter_map(|shelf| shelf.get("contents").and_then(Value::as_array))
        .flatten()
        .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
        .filter_map(|renderer| {
            let id = text_at(renderer, "/playlistItemData/videoId").or_else(|| {
                text_at(
                    renderer,
                    "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId",
                )
            })?;
            Some(SearchMatch { id })
        })
        .collect()
}

/// Playlists on a library page or continuation. Tiles that do not open a
/// playlist (such as "New playlist") are skipped.
pub fn library_playlists(response: &Value) -> Vec<DestinationPlaylist> {
    let mut tiles = Vec::new();
    find_all(response, "musicTwoRowItemRenderer", &mut tiles);

    tiles
        .into_iter()
        .filter_map(|tile| {
            let browse_id = text_at(tile, "/navigationEndpoint/browseEndpoint/browseId")?;
            let name = text_at(tile, "/title/runs/0/text")?;
            let id = browse_id
                .strip_prefix("VL")
                .map(str::to_string)
                .unwrap_or(browse_id);
            Some(DestinationPlaylist { id, name })
        })
        .collect()
}

/// Token for the next page of a browse response, if there is one.
pub fn continuation_token(response: &Value) -> Option<String> {
    let mut found = Vec::new();
    find_all(response, "nextContinuationData", &mut found);
    if let Some(token) = found.iter().find_map(|v| text_at(v, "/continuation")) {
        return Some(token);
    }

    found.clear();
    find_all(response, "continuationCommand", &mut found);
    found.iter().find_map(|v| text_at(v, "/token"))
}

pub fn created_playlist_id(response: &Value) -> Option<String> {
    text_at(response, "/playlistId")
}

/// Status reported by `browse/edit_playlist`; `STATUS_SUCCEEDED` on success.
pub fn edit_status(response: &Value) -> Option<String> {
    text_at(response, "/status")
}

fn text_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Collects every value stored under `key`, depth first. Does not descend into matches.
fn find_all<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    out.push(v);
                } else {
                    find_all(v, key, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                find_all(item, key, out);
            }
        }
        _ => {}
    }
}
