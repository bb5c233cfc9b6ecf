use crate::{
    catalog::SourceCatalog,
    error::TransferError,
    types::{PlaylistEntry, SourcePlaylist},
};

/// Lists the source playlists created by the authenticated user, in library order.
///
/// Followed playlists and collaborative playlists owned by someone else are
/// left out. Any failure here aborts the run.
pub async fn owned_playlists<S: SourceCatalog>(
    source: &S,
) -> Result<Vec<SourcePlaylist>, TransferError> {
    let user_id = source
        .current_user_id()
        .await
        .map_err(|e| TransferError::classify(e, TransferError::Enumeration))?;

    let mut playlists = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = source
            .list_user_playlists(cursor.as_deref())
            .await
            .map_err(|e| TransferError::classify(e, TransferError::Enumeration))?;

        playlists.extend(page.items.into_iter().filter(|p| p.owner_id == user_id));

        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(playlists)
}

/// Fetches every entry of a playlist, following the cursor until the last page.
pub async fn playlist_entries<S: SourceCatalog>(
    source: &S,
    playlist_id: &str,
) -> Result<Vec<PlaylistEntry>, TransferError> {
    let mut entries = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = source
            .list_playlist_tracks(playlist_id, cursor.as_deref())
            .await
            .map_err(|e| TransferError::classify(e, TransferError::Tracks))?;

        entries.extend(page.items);

        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(entries)
}
