use crate::{catalog::DestinationCatalog, error::TransferError};

use super::{guard::DuplicateGuard, report::Reporter};

/// Most items the destination accepts in one playlist edit.
pub const BATCH_LIMIT: usize = 100;
/// Used when nothing of the original name survives sanitizing.
pub const FALLBACK_NAME: &str = "Imported Playlist";

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPlaylist {
    pub id: String,
    /// Name the playlist was created with, sanitized if the first attempt failed.
    pub name: String,
    pub added: usize,
}

/// Keeps printable ASCII except `<` and `>`, trimmed. Falls back to [`FALLBACK_NAME`].
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '<' && *c != '>')
        .collect();

    let kept = kept.trim();
    if kept.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        kept.to_string()
    }
}

/// Creates the playlist, retrying once with a sanitized name if the service rejects it.
///
/// Returns the new playlist's id and the name it was created with, or `None`
/// if the sanitized name is already taken according to `guard`.
pub async fn create<D: DestinationCatalog>(
    destination: &D,
    guard: &DuplicateGuard,
    name: &str,
    description: &str,
    reporter: &Reporter,
) -> Result<Option<(String, String)>, TransferError> {
    let err = match destination.create_playlist(name, description).await {
        Ok(id) => return Ok(Some((id, name.to_string()))),
        Err(e) if e.is_auth() => return Err(TransferError::Auth(e)),
        Err(e) => e,
    };

    reporter.creation_retry(name, &err);
    let sanitized = sanitize_name(name);

    if guard.is_duplicate(destination, &sanitized).await {
        reporter.skipped(&sanitized);
        return Ok(None);
    }

    match destination.create_playlist(&sanitized, description).await {
        Ok(id) => Ok(Some((id, sanitized))),
        Err(e) if e.is_auth() => Err(TransferError::Auth(e)),
        Err(e) => Err(TransferError::Creation {
            name: sanitized,
            source: e,
        }),
    }
}

/// Adds `item_ids` in consecutive batches of at most [`BATCH_LIMIT`].
///
/// Stops at the first failing batch; batches added before stay in the playlist.
pub async fn add_in_batches<D: DestinationCatalog>(
    destination: &D,
    playlist_id: &str,
    item_ids: &[String],
    reporter: &Reporter,
) -> Result<usize, TransferError> {
    let mut added = 0;

    for (i, batch) in item_ids.chunks(BATCH_LIMIT).enumerate() {
        if let Err(e) = destination.add_items(playlist_id, batch).await {
            if e.is_auth() {
                return Err(TransferError::Auth(e));
            }
            return Err(TransferError::AddItems {
                playlist_id: playlist_id.to_string(),
                added,
                source: e,
            });
        }

        added += batch.len();
        reporter.batch_added(i + 1, batch.len());
    }

    Ok(added)
}

/// Creates the destination playlist, even without any tracks, then fills it.
///
/// `None` means nothing was created because the sanitized fallback name is a duplicate.
pub async fn build<D: DestinationCatalog>(
    destination: &D,
    guard: &DuplicateGuard,
    name: &str,
    description: &str,
    item_ids: &[String],
    reporter: &Reporter,
) -> Result<Option<BuiltPlaylist>, TransferError> {
    let Some((id, created_name)) = create(destination, guard, name, description, reporter).await?
    else {
        return Ok(None);
    };
    let added = add_in_batches(destination, &id, item_ids, reporter).await?;

    Ok(Some(BuiltPlaylist {
        id,
        name: created_name,
        added,
    }))
}
