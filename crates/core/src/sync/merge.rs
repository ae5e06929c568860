//! Chunked fetch-merge: turn a list of remote identifiers into locally
//! persisted records, one page at a time.

use std::future::Future;

use tracing::debug;

use crate::library::LibraryError;
use crate::remote::RemoteError;

use super::{RequestPolicy, SyncError};

/// Fetch the records behind `ids` in pages of `page_size` and merge each page
/// as it arrives.
///
/// Issues exactly ⌈N/P⌉ network calls, each through `policy`. After every
/// page `progress` receives the number of identifiers still to fetch. Returns
/// the total number of records merged.
pub(crate) async fn fetch_merge<T, F, Fut, M, P>(
    policy: &RequestPolicy,
    ids: &[i64],
    page_size: usize,
    fetch: F,
    mut merge: M,
    mut progress: P,
) -> Result<u32, SyncError>
where
    F: Fn(Vec<i64>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, RemoteError>>,
    M: FnMut(Vec<T>) -> Result<u32, LibraryError>,
    P: FnMut(usize),
{
    let total = ids.len();
    let pages = total.div_ceil(page_size);
    let mut merged = 0u32;

    for (index, page) in ids.chunks(page_size).enumerate() {
        debug!("Requesting chunk {} of {}", index + 1, pages);
        let records = policy.run(|| fetch(page.to_vec())).await?;
        merged += merge(records)?;

        let remaining = total - (index * page_size + page.len());
        progress(remaining);
    }

    Ok(merged)
}
