use crate::{Error, Result};

const PAGE_KEY: &str = "page=";

/// Rewrites `url` to point at the following listing page.
///
/// An existing `page=N` becomes `page=N+1` with trailing parameters kept in place;
/// otherwise `page=2` is appended to the query string, opening one if needed.
pub fn advance(url: &str) -> Result<String> {
    let Some(start) = url.find(PAGE_KEY) else {
        let sep = if url.contains('?') { '&' } else { '?' };
        return Ok(format!("{url}{sep}page=2"));
    };

    let num_start = start + PAGE_KEY.len();
    let num_end = url[num_start..]
        .find('&')
        .map_or(url.len(), |i| num_start + i);

    let page = url[num_start..num_end]
        .parse::<u64>()
        .ok()
        .and_then(|p| p.checked_add(1))
        .ok_or_else(|| Error::MalformedPageParam { url: url.into() })?;

    Ok(format!("{}{page}{}", &url[..num_start], &url[num_end..]))
}
