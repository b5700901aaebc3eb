use crate::error::Error;
use url::Url;

/// Appends `segments` to the base URL path.
///
/// Any query or fragment on the base is dropped, and a trailing empty path
/// segment (from a base ending in `/`) is removed first.
pub(crate) fn build_url(base_url: &Url, segments: &[&str]) -> Result<Url, Error> {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut path_segments = url
            .path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(base_url.to_string()))?;
        path_segments.pop_if_empty();
        for segment in segments {
            path_segments.push(segment);
        }
    }
    Ok(url)
}
