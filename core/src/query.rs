//! Query-string encoding.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except `A-Z a-z 0-9 - . _ *` is escaped. Space becomes `%20`.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'*');

/// Join `key=value` pairs with `&`, percent-encoding each value.
///
/// Keys are written verbatim and are assumed unique; pairs appear in the
/// order `params` yields them, so pass an ordered collection when the
/// order matters.
pub fn map_to_url_encoded_parameters<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                key.as_ref(),
                utf8_percent_encode(value.as_ref(), FORM_VALUE)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
