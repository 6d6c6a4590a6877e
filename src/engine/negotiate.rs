//! `Accept` header negotiation.

use tracing::trace;

struct MediaRange<'a> {
    kind: &'a str,
    subtype: &'a str,
    quality: f32,
}

impl MediaRange<'_> {
    fn is_wildcard(&self) -> bool {
        self.kind == "*" || self.subtype == "*"
    }

    /// Specificity of the match against `media_type`, or `None` when it does not match.
    fn specificity(&self, media_type: &str) -> Option<u8> {
        let (kind, subtype) = media_type.split_once('/')?;
        match (self.kind, self.subtype) {
            ("*", "*") => Some(0),
            (k, "*") if k.eq_ignore_ascii_case(kind) => Some(1),
            (k, s) if k.eq_ignore_ascii_case(kind) && s.eq_ignore_ascii_case(subtype) => Some(2),
            _ => None,
        }
    }
}

fn parse_accept(accept: &str) -> Vec<MediaRange<'_>> {
    accept
        .split(',')
        .filter_map(|entry| {
            let mut params = entry.split(';');
            let range = params.next()?.trim();
            let (kind, subtype) = range.split_once('/')?;
            let quality = params
                .filter_map(|param| param.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some(MediaRange {
                kind: kind.trim(),
                subtype: subtype.trim(),
                quality,
            })
        })
        .collect()
}

/// Pick the candidate media type the client prefers.
///
/// A missing `Accept` header means `*/*`. Each candidate takes the quality of
/// the most specific range matching it (the first one listed, among equally
/// specific ranges); candidates with quality 0 are not
/// acceptable. With `explicit_only`, wildcard ranges are ignored, so only a
/// client naming the type gets it. Ties go to the earlier candidate.
///
/// ```rust
/// use halform::engine::negotiate::preferred_media_type;
///
/// let candidates = vec!["application/hal+json".to_string()];
/// assert_eq!(
///     preferred_media_type(Some("application/hal+json"), &candidates, true).as_deref(),
///     Some("application/hal+json")
/// );
/// assert_eq!(preferred_media_type(Some("*/*"), &candidates, true), None);
/// assert_eq!(preferred_media_type(Some("text/html"), &candidates, false), None);
/// ```
#[must_use]
pub fn preferred_media_type(
    accept: Option<&str>,
    candidates: &[String],
    explicit_only: bool,
) -> Option<String> {
    let accept = accept.map(str::trim).filter(|accept| !accept.is_empty()).unwrap_or("*/*");
    let ranges: Vec<_> = parse_accept(accept)
        .into_iter()
        .filter(|range| !(explicit_only && range.is_wildcard()))
        .collect();

    let mut best: Option<(&String, f32)> = None;
    for candidate in candidates {
        let quality = ranges
            .iter()
            .filter_map(|range| range.specificity(candidate).map(|s| (s, range.quality)))
            .fold(None, |best: Option<(u8, f32)>, (specificity, quality)| match best {
                Some((best_specificity, _)) if best_specificity >= specificity => best,
                _ => Some((specificity, quality)),
            })
            .map(|(_, quality)| quality);
        trace!("Accept '{}' rates {} at {:?}", accept, candidate, quality);

        match (quality, best) {
            (Some(q), _) if q <= 0.0 => {}
            (Some(q), Some((_, best_q))) if q <= best_q => {}
            (Some(q), _) => best = Some((candidate, q)),
            (None, _) => {}
        }
    }
    best.map(|(candidate, _)| candidate.clone())
}
